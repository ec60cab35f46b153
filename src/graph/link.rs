//! Link variants and their cost semantics.

use serde::{Deserialize, Serialize};

use super::VertexId;

/// Identifier of a link inside one graph generation.
pub type LinkId = usize;

/// Whether a zigzag link may, must, or must not be serviced by zigzagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZigZagStatus {
    /// Zigzag service is allowed.
    Optional,
    /// Zigzag service is required.
    Mandatory,
    /// Zigzag service is forbidden.
    NotAvailable,
}

/// A closed interval of admissible accumulated route cost.
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::TimeWindow;
///
/// let tw = TimeWindow::new(10, 20).unwrap();
/// assert!(tw.contains(15));
/// assert!(!tw.contains(21));
/// assert!(TimeWindow::new(5, 1).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// Creates a window; `None` if `start > end`.
    pub fn new(start: i64, end: i64) -> Option<Self> {
        if start > end {
            return None;
        }
        Some(Self { start, end })
    }

    /// A window that never binds.
    pub fn unbounded() -> Self {
        Self {
            start: i64::MIN,
            end: i64::MAX,
        }
    }

    /// Earliest admissible value.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Latest admissible value.
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Returns `true` if `value` lies inside the window.
    pub fn contains(&self, value: i64) -> bool {
        value >= self.start && value <= self.end
    }
}

/// Extra data carried by zigzag links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZigZagAttributes {
    /// Deadhead cost from second to first endpoint.
    pub reverse_cost: i64,
    /// Cost of servicing both sides at once by zigzagging.
    pub zigzag_cost: i64,
    /// Service cost when traversed first → second.
    pub service_cost: i64,
    /// Service cost when traversed second → first.
    pub reverse_service_cost: i64,
    /// Window in which a zigzag must start and finish.
    pub window: TimeWindow,
    /// Zigzag eligibility.
    pub status: ZigZagStatus,
}

/// Variant-specific link data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Undirected, symmetric cost.
    Edge,
    /// Directed from first (tail) to second (head).
    Arc,
    /// Link of a mixed graph; directed or not.
    MixedEdge {
        /// `true` if only first → second is allowed.
        directed: bool,
    },
    /// Undirected with a distinct reverse cost.
    Windy {
        /// Cost from second to first endpoint.
        reverse_cost: i64,
    },
    /// Windy link with zigzag service options.
    ZigZag(ZigZagAttributes),
}

impl LinkKind {
    /// Short variant name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Arc => "arc",
            Self::MixedEdge { .. } => "mixed",
            Self::Windy { .. } => "windy",
            Self::ZigZag(_) => "zigzag",
        }
    }
}

/// Plain description of a link to be admitted by a graph.
///
/// Only a [`Graph`](super::Graph) turns a spec into a [`Link`] with an id.
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::{Graph, GraphKind, LinkSpec};
///
/// let mut g = Graph::with_vertices(GraphKind::Windy, 2);
/// let id = g.add_link(LinkSpec::windy(1, 2, 3, 4).required(true)).unwrap();
/// let link = g.link(id).unwrap();
/// assert_eq!(link.traversal_cost(true), 3);
/// assert_eq!(link.traversal_cost(false), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSpec {
    /// First (tail) endpoint.
    pub first: VertexId,
    /// Second (head) endpoint.
    pub second: VertexId,
    /// Forward cost.
    pub cost: i64,
    /// Whether the link must be serviced.
    pub required: bool,
    /// Load consumed by servicing this link.
    pub demand: i64,
    /// Variant data.
    pub kind: LinkKind,
}

impl LinkSpec {
    fn with_kind(first: VertexId, second: VertexId, cost: i64, kind: LinkKind) -> Self {
        Self {
            first,
            second,
            cost,
            required: false,
            demand: 0,
            kind,
        }
    }

    /// An undirected edge.
    pub fn edge(first: VertexId, second: VertexId, cost: i64) -> Self {
        Self::with_kind(first, second, cost, LinkKind::Edge)
    }

    /// A directed arc `tail → head`.
    pub fn arc(tail: VertexId, head: VertexId, cost: i64) -> Self {
        Self::with_kind(tail, head, cost, LinkKind::Arc)
    }

    /// A mixed-graph link.
    pub fn mixed(first: VertexId, second: VertexId, cost: i64, directed: bool) -> Self {
        Self::with_kind(first, second, cost, LinkKind::MixedEdge { directed })
    }

    /// A windy edge.
    pub fn windy(first: VertexId, second: VertexId, cost: i64, reverse_cost: i64) -> Self {
        Self::with_kind(first, second, cost, LinkKind::Windy { reverse_cost })
    }

    /// A zigzag link.
    pub fn zigzag(first: VertexId, second: VertexId, cost: i64, attributes: ZigZagAttributes) -> Self {
        Self::with_kind(first, second, cost, LinkKind::ZigZag(attributes))
    }

    /// Sets the required flag.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the demand.
    pub fn with_demand(mut self, demand: i64) -> Self {
        self.demand = demand;
        self
    }
}

/// A link admitted by a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub(crate) id: LinkId,
    pub(crate) guid: usize,
    pub(crate) match_id: Option<LinkId>,
    pub(crate) first: VertexId,
    pub(crate) second: VertexId,
    pub(crate) cost: i64,
    pub(crate) required: bool,
    pub(crate) demand: i64,
    pub(crate) kind: LinkKind,
}

impl Link {
    /// Id within the owning graph.
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Process-wide identity, preserved by deep copies.
    pub fn guid(&self) -> usize {
        self.guid
    }

    /// Id of the link this one was copied from, if any.
    pub fn match_id(&self) -> Option<LinkId> {
        self.match_id
    }

    /// First endpoint (tail for directed links).
    pub fn first(&self) -> VertexId {
        self.first
    }

    /// Second endpoint (head for directed links).
    pub fn second(&self) -> VertexId {
        self.second
    }

    /// Both endpoints in stored order.
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.first, self.second)
    }

    /// Forward cost.
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// Whether the link must be serviced.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Load consumed by servicing this link.
    pub fn demand(&self) -> i64 {
        self.demand
    }

    /// Variant data.
    pub fn kind(&self) -> &LinkKind {
        &self.kind
    }

    /// `true` if the link may only be traversed first → second.
    pub fn is_directed(&self) -> bool {
        matches!(
            self.kind,
            LinkKind::Arc | LinkKind::MixedEdge { directed: true }
        )
    }

    /// `true` if the reverse cost may differ from the forward cost.
    pub fn is_windy(&self) -> bool {
        matches!(self.kind, LinkKind::Windy { .. } | LinkKind::ZigZag(_))
    }

    /// Zigzag data, if this is a zigzag link.
    pub fn zigzag(&self) -> Option<&ZigZagAttributes> {
        match &self.kind {
            LinkKind::ZigZag(attributes) => Some(attributes),
            _ => None,
        }
    }

    /// Cost from second to first endpoint.
    pub fn reverse_cost(&self) -> i64 {
        match self.kind {
            LinkKind::Windy { reverse_cost } => reverse_cost,
            LinkKind::ZigZag(attributes) => attributes.reverse_cost,
            _ => self.cost,
        }
    }

    /// Deadhead cost in the given direction.
    pub fn traversal_cost(&self, forward: bool) -> i64 {
        if forward {
            self.cost
        } else {
            self.reverse_cost()
        }
    }

    /// Service cost on top of traversal (zero for non-zigzag links).
    pub fn service_cost(&self, forward: bool) -> i64 {
        match self.zigzag() {
            Some(attributes) if forward => attributes.service_cost,
            Some(attributes) => attributes.reverse_service_cost,
            None => 0,
        }
    }

    /// Total contribution of one serviced traversal.
    pub fn serviced_cost(&self, forward: bool, zigzag: bool) -> i64 {
        let service = match self.zigzag() {
            Some(attributes) if zigzag => attributes.zigzag_cost,
            _ => self.service_cost(forward),
        };
        self.traversal_cost(forward) + service
    }

    /// Vertex where a traversal in the given direction starts.
    pub fn start(&self, forward: bool) -> VertexId {
        if forward {
            self.first
        } else {
            self.second
        }
    }

    /// Vertex where a traversal in the given direction ends.
    pub fn end(&self, forward: bool) -> VertexId {
        if forward {
            self.second
        } else {
            self.first
        }
    }

    /// The endpoint opposite `v`, or `None` if `v` is not an endpoint.
    pub fn other_endpoint(&self, v: VertexId) -> Option<VertexId> {
        if v == self.first {
            Some(self.second)
        } else if v == self.second {
            Some(self.first)
        } else {
            None
        }
    }

    /// `true` if `v` is one of the endpoints.
    pub fn touches(&self, v: VertexId) -> bool {
        self.first == v || self.second == v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag_link() -> Link {
        Link {
            id: 1,
            guid: 1,
            match_id: None,
            first: 1,
            second: 2,
            cost: 4,
            required: true,
            demand: 0,
            kind: LinkKind::ZigZag(ZigZagAttributes {
                reverse_cost: 6,
                zigzag_cost: 9,
                service_cost: 2,
                reverse_service_cost: 3,
                window: TimeWindow::unbounded(),
                status: ZigZagStatus::Optional,
            }),
        }
    }

    #[test]
    fn test_zigzag_costs() {
        let link = zigzag_link();
        assert_eq!(link.serviced_cost(true, false), 6);
        assert_eq!(link.serviced_cost(false, false), 9);
        assert_eq!(link.serviced_cost(true, true), 13);
        assert_eq!(link.serviced_cost(false, true), 15);
    }

    #[test]
    fn test_orientation_helpers() {
        let link = zigzag_link();
        assert_eq!(link.start(false), 2);
        assert_eq!(link.end(false), 1);
        assert_eq!(link.other_endpoint(2), Some(1));
        assert_eq!(link.other_endpoint(7), None);
        assert!(!link.is_directed());
        assert!(link.is_windy());
    }

    #[test]
    fn test_symmetric_reverse_cost() {
        let mut link = zigzag_link();
        link.kind = LinkKind::Edge;
        assert_eq!(link.reverse_cost(), 4);
        assert_eq!(link.service_cost(false), 0);
    }
}
