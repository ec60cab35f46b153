//! Re-expansion of compact routes into full tours.

use super::{CompactRoute, Route, RouteKind};
use crate::distance::ShortestPaths;
use crate::error::{Result, RoutingError};
use crate::graph::{Graph, VertexId};

/// Rebuilds tours from their serviced links by inserting shortest-path
/// deadheads between consecutive services and back to the depot.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
/// let a = g.add_edge(1, 2, 2, false).unwrap();
/// let b = g.add_edge(2, 3, 4, true).unwrap();
/// let c = g.add_edge(3, 1, 7, false).unwrap();
/// let sp = ShortestPaths::compute(&g);
///
/// let expander = RouteExpander::new(&g, &sp);
/// let route = expander
///     .unflatten(&CompactRoute::forward_only(vec![b]), RouteKind::Tour)
///     .unwrap();
/// assert_eq!(route.cost(), 2 + 4 + 6);
/// assert_eq!(route.to_string(), "1-2-3-2-1");
/// # let _ = (a, c);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteExpander<'a> {
    graph: &'a Graph,
    paths: &'a ShortestPaths,
}

impl<'a> RouteExpander<'a> {
    /// Creates an expander over a graph and its shortest-path snapshot.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths) -> Self {
        Self { graph, paths }
    }

    fn deadhead(&self, route: &mut Route, from: VertexId, to: VertexId) -> Result<()> {
        for (link, at) in self.paths.require_link_path(from, to)? {
            let forward = self.graph.require_link(link)?.first() == at;
            route.append_link_directed(self.graph, link, forward, false, false)?;
        }
        Ok(())
    }

    /// Expands `compact` into a tour of `kind` anchored at the graph depot.
    ///
    /// # Errors
    ///
    /// [`RoutingError::UnsupportedRoute`] for paths,
    /// [`RoutingError::Disconnected`] if a deadhead is impossible, and any
    /// route construction error (zigzag windows in particular).
    pub fn unflatten(&self, compact: &CompactRoute, kind: RouteKind) -> Result<Route> {
        if !kind.is_tour() {
            return Err(RoutingError::UnsupportedRoute(
                "only tours can be expanded from a compact form".to_string(),
            ));
        }
        let depot = self.graph.depot();
        let mut route = Route::empty(kind, depot);
        let mut at = depot;
        for (link_id, forward, zigzag) in compact.iter() {
            let link = self.graph.require_link(link_id)?;
            self.deadhead(&mut route, at, link.start(forward))?;
            route.append_link_directed(self.graph, link_id, forward, true, zigzag)?;
            at = link.end(forward);
        }
        self.deadhead(&mut route, at, depot)?;
        Ok(route)
    }

    /// Expands the compact form of `route` again, keeping its kind.
    pub fn rebuild(&self, route: &Route) -> Result<Route> {
        self.unflatten(route.compact(), route.kind())
    }

    /// Cost of the tour [`unflatten`](Self::unflatten) would build, from
    /// distances alone.
    pub fn cost_of(&self, compact: &CompactRoute) -> Result<i64> {
        let depot = self.graph.depot();
        let mut at = depot;
        let mut total = 0;
        for (link_id, forward, zigzag) in compact.iter() {
            let link = self.graph.require_link(link_id)?;
            total += self.paths.require_distance(at, link.start(forward))?;
            total += link.serviced_cost(forward, zigzag);
            at = link.end(forward);
        }
        Ok(total + self.paths.require_distance(at, depot)?)
    }
}
