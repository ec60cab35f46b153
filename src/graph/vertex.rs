//! Vertex and degree record types.

/// Identifier of a vertex inside one graph generation (dense, from 1).
pub type VertexId = usize;

/// Per-vertex degree bookkeeping.
///
/// The shape depends on the graph variant: undirected-style graphs count
/// incident links, directed graphs count arcs in and out, mixed graphs track
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeRecord {
    /// Number of incident undirected links (a self-loop counts twice).
    Undirected {
        /// Incident undirected links.
        degree: usize,
    },
    /// Arcs entering and leaving the vertex.
    Directed {
        /// Arcs whose head is this vertex.
        in_degree: usize,
        /// Arcs whose tail is this vertex.
        out_degree: usize,
    },
    /// Both kinds, for mixed graphs.
    Mixed {
        /// Incident undirected links.
        degree: usize,
        /// Arcs whose head is this vertex.
        in_degree: usize,
        /// Arcs whose tail is this vertex.
        out_degree: usize,
    },
}

/// A change to a degree record caused by one link endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DegreeChange {
    /// Undirected incidences.
    pub degree: usize,
    /// Incoming arcs.
    pub in_degree: usize,
    /// Outgoing arcs.
    pub out_degree: usize,
}

impl DegreeRecord {
    /// Adds (`insert = true`) or subtracts a change.
    ///
    /// Subtraction saturates at zero; the graph only subtracts changes it
    /// previously added.
    pub(crate) fn apply(&mut self, change: DegreeChange, insert: bool) {
        let adjust = |value: &mut usize, by: usize| {
            if insert {
                *value += by;
            } else {
                *value = value.saturating_sub(by);
            }
        };
        match self {
            Self::Undirected { degree } => adjust(degree, change.degree),
            Self::Directed {
                in_degree,
                out_degree,
            } => {
                adjust(in_degree, change.in_degree);
                adjust(out_degree, change.out_degree);
            }
            Self::Mixed {
                degree,
                in_degree,
                out_degree,
            } => {
                adjust(degree, change.degree);
                adjust(in_degree, change.in_degree);
                adjust(out_degree, change.out_degree);
            }
        }
    }

    /// Total number of link incidences recorded.
    pub fn total(&self) -> usize {
        match *self {
            Self::Undirected { degree } => degree,
            Self::Directed {
                in_degree,
                out_degree,
            } => in_degree + out_degree,
            Self::Mixed {
                degree,
                in_degree,
                out_degree,
            } => degree + in_degree + out_degree,
        }
    }

    /// Undirected incidences (zero for directed records).
    pub fn undirected(&self) -> usize {
        match *self {
            Self::Undirected { degree } | Self::Mixed { degree, .. } => degree,
            Self::Directed { .. } => 0,
        }
    }

    /// In-degree minus out-degree (zero for undirected records).
    pub fn delta(&self) -> i64 {
        match *self {
            Self::Undirected { .. } => 0,
            Self::Directed {
                in_degree,
                out_degree,
            }
            | Self::Mixed {
                in_degree,
                out_degree,
                ..
            } => in_degree as i64 - out_degree as i64,
        }
    }
}

/// A vertex owned by a [`Graph`](super::Graph).
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::{Graph, GraphKind};
///
/// let mut g = Graph::new(GraphKind::Undirected);
/// let v = g.add_vertex_at(1.0, 2.0);
/// let vertex = g.vertex(v).unwrap();
/// assert_eq!(vertex.id(), 1);
/// assert_eq!(vertex.coordinates(), Some((1.0, 2.0)));
/// assert_eq!(vertex.degree().total(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub(crate) id: VertexId,
    pub(crate) guid: usize,
    pub(crate) match_id: Option<VertexId>,
    pub(crate) coordinates: Option<(f64, f64)>,
    pub(crate) degree: DegreeRecord,
}

impl Vertex {
    /// Id within the owning graph.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Process-wide identity, preserved by deep copies.
    pub fn guid(&self) -> usize {
        self.guid
    }

    /// Id of the vertex this one was copied from, if any.
    pub fn match_id(&self) -> Option<VertexId> {
        self.match_id
    }

    /// Planar coordinates, if assigned.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.coordinates
    }

    /// Degree bookkeeping for this vertex.
    pub fn degree(&self) -> &DegreeRecord {
        &self.degree
    }
}
