//! Flattened route with incremental cost tracking.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::CompactRoute;
use crate::error::{Result, RoutingError};
use crate::graph::{Graph, Link, LinkId, VertexId, ZigZagStatus};

/// Route variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteKind {
    /// Open walk; its first link is oriented by the second.
    Path,
    /// Closed walk starting and ending at the depot.
    Tour,
    /// Tour that also tracks zigzag service and time windows.
    ZigZagTour,
}

impl RouteKind {
    /// `true` for the closed variants.
    pub fn is_tour(&self) -> bool {
        matches!(self, Self::Tour | Self::ZigZagTour)
    }
}

/// Orientation state. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteState {
    /// No links yet.
    Empty,
    /// A path with one undirected link whose direction is still open.
    Orienting,
    /// Every traversal direction is fixed.
    Active,
}

/// One step of a flattened route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    /// Link traversed.
    pub link: LinkId,
    /// `true` if traversed first → second.
    pub forward: bool,
    /// `true` if this traversal services the link.
    pub serviced: bool,
    /// `true` if the service is a zigzag.
    pub zigzag: bool,
}

impl Traversal {
    /// Cost contributed by this step.
    pub fn cost(&self, link: &Link) -> i64 {
        if self.serviced {
            link.serviced_cost(self.forward, self.zigzag)
        } else {
            link.traversal_cost(self.forward)
        }
    }
}

/// A route kept in flattened and compact form at once.
///
/// Routes hold link ids only; every operation takes the graph the ids
/// belong to.
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::route::Route;
///
/// let mut g = Graph::with_vertices(GraphKind::Windy, 3);
/// let a = g.add_windy_edge(1, 2, 3, 4, true).unwrap();
/// let b = g.add_windy_edge(2, 3, 1, 1, false).unwrap();
/// let c = g.add_windy_edge(1, 3, 5, 2, true).unwrap();
///
/// let mut r = Route::tour(1);
/// r.append_link(&g, a, true, false).unwrap();
/// r.append_link(&g, b, false, false).unwrap();
/// r.append_link(&g, c, true, false).unwrap();
/// assert_eq!(r.cost(), 3 + 1 + 2);
/// assert_eq!(r.compact().links(), &[a, c]);
/// assert_eq!(r.to_string(), "1-2-3-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    kind: RouteKind,
    depot: Option<VertexId>,
    traversals: Vec<Traversal>,
    incremental: Vec<i64>,
    compact: CompactRoute,
    compact_positions: Vec<usize>,
    walk: Vec<VertexId>,
    cost: i64,
    state: RouteState,
    end: Option<VertexId>,
}

impl Route {
    fn with_kind(kind: RouteKind, depot: Option<VertexId>) -> Self {
        Self {
            kind,
            depot,
            traversals: Vec::new(),
            incremental: Vec::new(),
            compact: CompactRoute::new(),
            compact_positions: Vec::new(),
            walk: Vec::new(),
            cost: 0,
            state: RouteState::Empty,
            end: depot,
        }
    }

    /// Empty open path.
    pub fn path() -> Self {
        Self::with_kind(RouteKind::Path, None)
    }

    /// Empty tour anchored at `depot`.
    pub fn tour(depot: VertexId) -> Self {
        Self::with_kind(RouteKind::Tour, Some(depot))
    }

    /// Empty zigzag tour anchored at `depot`.
    pub fn zigzag_tour(depot: VertexId) -> Self {
        Self::with_kind(RouteKind::ZigZagTour, Some(depot))
    }

    /// Empty route of `kind`; `depot` is ignored for paths.
    pub fn empty(kind: RouteKind, depot: VertexId) -> Self {
        match kind {
            RouteKind::Path => Self::path(),
            RouteKind::Tour => Self::tour(depot),
            RouteKind::ZigZagTour => Self::zigzag_tour(depot),
        }
    }

    /// Route variant.
    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// Depot for tours, `None` for paths.
    pub fn depot(&self) -> Option<VertexId> {
        self.depot
    }

    /// Orientation state.
    pub fn state(&self) -> RouteState {
        self.state
    }

    /// Total cost.
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// Flattened traversals.
    pub fn traversals(&self) -> &[Traversal] {
        &self.traversals
    }

    /// Cumulative cost after each flattened position.
    pub fn incremental_costs(&self) -> &[i64] {
        &self.incremental
    }

    /// Serviced-only view.
    pub fn compact(&self) -> &CompactRoute {
        &self.compact
    }

    /// Number of flattened traversals.
    pub fn len(&self) -> usize {
        self.traversals.len()
    }

    /// `true` if no link has been appended.
    pub fn is_empty(&self) -> bool {
        self.traversals.is_empty()
    }

    /// Current end vertex (the depot for an empty tour).
    pub fn end_vertex(&self) -> Option<VertexId> {
        self.end
    }

    /// `true` if the route is a tour that is back at its depot.
    pub fn is_closed(&self) -> bool {
        self.kind.is_tour() && self.end == self.depot
    }

    /// `true` if `link` is serviced somewhere on the route.
    pub fn services(&self, link: LinkId) -> bool {
        self.compact.links().contains(&link)
    }

    /// Total demand of the serviced links.
    pub fn demand(&self, graph: &Graph) -> i64 {
        self.compact
            .links()
            .iter()
            .filter_map(|&l| graph.link(l))
            .map(Link::demand)
            .sum()
    }

    fn cost_before(&self, position: usize) -> i64 {
        if position == 0 {
            0
        } else {
            self.incremental[position - 1]
        }
    }

    fn zigzag_error(link: LinkId, reason: impl Into<String>) -> RoutingError {
        RoutingError::InfeasibleZigZag {
            link,
            reason: reason.into(),
        }
    }

    /// Checks a zigzag service of `link` started at accumulated cost
    /// `before`.
    fn check_zigzag(&self, link: &Link, service: bool, before: i64) -> Result<()> {
        if self.kind != RouteKind::ZigZagTour {
            return Err(Self::zigzag_error(link.id(), "route does not track zigzags"));
        }
        let Some(attributes) = link.zigzag() else {
            return Err(Self::zigzag_error(link.id(), "not a zigzag link"));
        };
        if attributes.status == ZigZagStatus::NotAvailable {
            return Err(Self::zigzag_error(link.id(), "zigzag service not available"));
        }
        if !link.is_required() || !service {
            return Err(Self::zigzag_error(link.id(), "zigzag requires a serviced required link"));
        }
        check_window(link, before)
    }

    /// Verifies that shifting every position after `position` by `delta`
    /// keeps elected zigzags inside their windows.
    fn check_downstream(&self, graph: &Graph, position: usize, delta: i64) -> Result<()> {
        if self.kind != RouteKind::ZigZagTour || delta == 0 {
            return Ok(());
        }
        for j in (position + 1)..self.traversals.len() {
            let t = self.traversals[j];
            if t.zigzag {
                let link = graph.require_link(t.link)?;
                check_window(link, self.cost_before(j) + delta)?;
            }
        }
        Ok(())
    }

    /// Direction in which `link` can leave `vertex`, preferring forward.
    fn leaving(link: &Link, vertex: VertexId) -> Option<bool> {
        if link.first() == vertex {
            Some(true)
        } else if link.second() == vertex && !link.is_directed() {
            Some(false)
        } else {
            None
        }
    }

    /// Appends a link, resolving its direction from the current end vertex.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::UnanchoredRoute`] if the first link of a tour
    ///   cannot leave the depot.
    /// - [`RoutingError::MalformedRoute`] if the link does not continue the
    ///   walk.
    /// - [`RoutingError::NotRequired`] for service on a non-required link.
    /// - [`RoutingError::InfeasibleZigZag`] for an invalid zigzag request.
    ///
    /// The route is unchanged on error.
    pub fn append_link(&mut self, graph: &Graph, id: LinkId, service: bool, zigzag: bool) -> Result<()> {
        self.append(graph, id, None, service, zigzag)
    }

    /// Appends a link in an explicit direction.
    pub fn append_link_directed(
        &mut self,
        graph: &Graph,
        id: LinkId,
        forward: bool,
        service: bool,
        zigzag: bool,
    ) -> Result<()> {
        self.append(graph, id, Some(forward), service, zigzag)
    }

    fn append(
        &mut self,
        graph: &Graph,
        id: LinkId,
        direction: Option<bool>,
        service: bool,
        zigzag: bool,
    ) -> Result<()> {
        let link = graph.require_link(id)?;
        if service && !link.is_required() {
            return Err(RoutingError::NotRequired(id));
        }
        if zigzag {
            self.check_zigzag(link, service, self.cost)?;
        }
        if direction == Some(false) && link.is_directed() {
            return Err(RoutingError::MalformedRoute(format!(
                "link {id} is directed and cannot be traversed backwards"
            )));
        }

        // Orientation of the pending first link of a path, if this append
        // resolves it.
        let mut resolve_first: Option<bool> = None;
        let forward = match (self.state, self.kind) {
            (RouteState::Empty, RouteKind::Path) => direction.unwrap_or(true),
            (RouteState::Empty, _) => {
                let depot = self.depot.unwrap_or(0);
                let from_depot = Self::leaving(link, depot);
                match (direction, from_depot) {
                    (Some(d), _) if link.start(d) == depot => d,
                    (None, Some(d)) => d,
                    _ => return Err(RoutingError::UnanchoredRoute { link: id, depot }),
                }
            }
            (RouteState::Orienting, _) => {
                let pending = graph.require_link(self.traversals[0].link)?;
                let mut found = None;
                for first_forward in [true, false] {
                    let end = pending.end(first_forward);
                    let leaves = match direction {
                        Some(d) => (link.start(d) == end).then_some(d),
                        None => Self::leaving(link, end),
                    };
                    if let Some(d) = leaves {
                        found = Some((first_forward, d));
                        break;
                    }
                }
                let (first_forward, d) = found.ok_or_else(|| {
                    RoutingError::MalformedRoute(format!(
                        "link {id} shares no endpoint with link {}",
                        pending.id()
                    ))
                })?;
                resolve_first = Some(first_forward);
                d
            }
            (RouteState::Active, _) => {
                let end = self.end.unwrap_or(0);
                let leaves = match direction {
                    Some(d) => (link.start(d) == end).then_some(d),
                    None => Self::leaving(link, end),
                };
                leaves.ok_or_else(|| {
                    RoutingError::MalformedRoute(format!(
                        "link {id} does not leave vertex {end}"
                    ))
                })?
            }
        };

        if let Some(first_forward) = resolve_first {
            if !first_forward {
                let pending = graph.require_link(self.traversals[0].link)?;
                let before = self.traversals[0].cost(pending);
                self.traversals[0].forward = false;
                let after = self.traversals[0].cost(pending);
                self.cost += after - before;
                self.incremental[0] = self.cost;
                self.walk = vec![pending.start(false), pending.end(false)];
            }
            self.state = RouteState::Active;
        }

        let traversal = Traversal {
            link: id,
            forward,
            serviced: service,
            zigzag,
        };
        if self.walk.is_empty() {
            self.walk.push(link.start(forward));
        }
        self.walk.push(link.end(forward));
        self.cost += traversal.cost(link);
        self.incremental.push(self.cost);
        self.traversals.push(traversal);
        self.end = Some(link.end(forward));
        if self.state == RouteState::Empty {
            self.state = if self.kind == RouteKind::Path && !link.is_directed() && direction.is_none() {
                RouteState::Orienting
            } else {
                RouteState::Active
            };
        }
        if resolve_first.is_some() {
            // The pending link's end may have moved.
            self.rebuild_compact();
        } else if service {
            self.compact.push(id, forward, zigzag);
            self.compact_positions.push(self.traversals.len() - 1);
        }
        Ok(())
    }

    fn rebuild_compact(&mut self) {
        self.compact = CompactRoute::new();
        self.compact_positions.clear();
        for (i, t) in self.traversals.iter().enumerate() {
            if t.serviced {
                self.compact.push(t.link, t.forward, t.zigzag);
                self.compact_positions.push(i);
            }
        }
    }

    fn shift_from(&mut self, position: usize, delta: i64) {
        for c in &mut self.incremental[position..] {
            *c += delta;
        }
        self.cost += delta;
    }

    /// Toggles whether the traversal at flattened `position` services its
    /// link.
    ///
    /// # Errors
    ///
    /// [`RoutingError::NotRequired`] when enabling service on a link that
    /// does not need it, [`RoutingError::InfeasibleZigZag`] if a later
    /// zigzag would leave its window. The route is unchanged on error.
    pub fn change_service(&mut self, graph: &Graph, position: usize) -> Result<()> {
        let Some(&old) = self.traversals.get(position) else {
            return Err(RoutingError::MalformedRoute(format!(
                "position {position} is outside a route of {} traversals",
                self.traversals.len()
            )));
        };
        let link = graph.require_link(old.link)?;
        let mut new = old;
        new.serviced = !old.serviced;
        new.zigzag = false;
        if new.serviced && !link.is_required() {
            return Err(RoutingError::NotRequired(old.link));
        }
        let delta = new.cost(link) - old.cost(link);
        self.check_downstream(graph, position, delta)?;

        self.traversals[position] = new;
        self.shift_from(position, delta);
        self.rebuild_compact();
        Ok(())
    }

    /// Toggles the zigzag election of the serviced link at `compact_index`.
    ///
    /// Enabling a zigzag is checked like an append at that position; in
    /// both directions later zigzags must stay inside their windows.
    pub fn change_zigzag(&mut self, graph: &Graph, compact_index: usize) -> Result<()> {
        let Some(&position) = self.compact_positions.get(compact_index) else {
            return Err(RoutingError::MalformedRoute(format!(
                "compact index {compact_index} is outside a route servicing {} links",
                self.compact.len()
            )));
        };
        let old = self.traversals[position];
        let link = graph.require_link(old.link)?;
        let mut new = old;
        new.zigzag = !old.zigzag;
        if new.zigzag {
            self.check_zigzag(link, true, self.cost_before(position))?;
        }
        let delta = new.cost(link) - old.cost(link);
        self.check_downstream(graph, position, delta)?;

        self.traversals[position] = new;
        self.compact.set_zigzag(compact_index, new.zigzag);
        self.shift_from(position, delta);
        Ok(())
    }

    /// Returns the compact form.
    pub fn flatten(&self) -> CompactRoute {
        self.compact.clone()
    }

    /// Vertices visited in order, starting vertex included.
    ///
    /// An empty tour yields just its depot.
    pub fn vertex_sequence(&self) -> Vec<VertexId> {
        if self.walk.is_empty() {
            return self.depot.into_iter().collect();
        }
        self.walk.clone()
    }

    /// Re-validates the whole route against `graph`.
    ///
    /// Checks link existence, continuity, direction of directed links,
    /// closure at the depot for tours, that only required links are
    /// serviced, zigzag windows, and that cost, incremental costs and the
    /// compact view agree with the traversals.
    pub fn check(&self, graph: &Graph) -> Result<()> {
        let malformed = |msg: String| Err(RoutingError::MalformedRoute(msg));
        let mut running = 0i64;
        let mut at: Option<VertexId> = if self.kind.is_tour() { self.depot } else { None };
        let mut compact = CompactRoute::new();
        let mut walk = Vec::with_capacity(self.walk.len());
        for (i, t) in self.traversals.iter().enumerate() {
            let link = graph.require_link(t.link)?;
            if link.is_directed() && !t.forward {
                return malformed(format!("directed link {} traversed backwards", t.link));
            }
            let start = link.start(t.forward);
            if at.is_some_and(|v| v != start) {
                return malformed(format!("link {} at position {i} does not continue the walk", t.link));
            }
            if t.serviced && !link.is_required() {
                return Err(RoutingError::NotRequired(t.link));
            }
            if t.zigzag {
                if !t.serviced {
                    return malformed(format!("link {} zigzagged without service", t.link));
                }
                self.check_zigzag(link, true, running)?;
            }
            running += t.cost(link);
            if self.incremental.get(i) != Some(&running) {
                return malformed(format!("incremental cost mismatch at position {i}"));
            }
            if t.serviced {
                compact.push(t.link, t.forward, t.zigzag);
            }
            if walk.is_empty() {
                walk.push(start);
            }
            walk.push(link.end(t.forward));
            at = Some(link.end(t.forward));
        }
        if self.kind.is_tour() && !self.traversals.is_empty() && at != self.depot {
            return malformed(format!("tour ends at {:?}, not at its depot", at));
        }
        if running != self.cost {
            return malformed(format!("cost {} but traversals sum to {running}", self.cost));
        }
        if compact != self.compact {
            return malformed("compact view does not match serviced traversals".to_string());
        }
        if walk != self.walk {
            return malformed("vertex walk does not match traversals".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for Route {
    /// Renders the vertex walk as `a-b-c`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.vertex_sequence().iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("-"))
    }
}

fn check_window(link: &Link, before: i64) -> Result<()> {
    let Some(attributes) = link.zigzag() else {
        return Ok(());
    };
    let window = attributes.window;
    if before < window.start() {
        return Err(RoutingError::InfeasibleZigZag {
            link: link.id(),
            reason: format!("window opens at {}, zigzag would start at {before}", window.start()),
        });
    }
    if before.saturating_add(attributes.zigzag_cost) > window.end() {
        return Err(RoutingError::InfeasibleZigZag {
            link: link.id(),
            reason: format!(
                "window closes at {}, zigzag would finish at {}",
                window.end(),
                before.saturating_add(attributes.zigzag_cost)
            ),
        });
    }
    Ok(())
}
