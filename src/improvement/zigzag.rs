//! Zigzag elections on zigzag tours.
//!
//! Mandatory links are elected when a route is built. The neighbourhood
//! then toggles the optional ones one at a time, keeping a toggle only if
//! the route gets cheaper and every window still holds.

use log::debug;

use super::IntraRouteImprovementProcedure;
use crate::error::{Result, RoutingError};
use crate::graph::{Graph, LinkId, ZigZagStatus};
use crate::route::{Route, RouteKind};

/// Elects and revises zigzag services.
///
/// Routes other than [`RouteKind::ZigZagTour`] pass through unchanged.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind, TimeWindow, ZigZagAttributes, ZigZagStatus};
/// use u_arc_routing::improvement::ChangeZigZagDecision;
/// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
///
/// let mut g = Graph::with_vertices(GraphKind::ZigZag, 2);
/// let attrs = ZigZagAttributes {
///     reverse_cost: 1,
///     zigzag_cost: 4,
///     service_cost: 1,
///     reverse_service_cost: 1,
///     window: TimeWindow::unbounded(),
///     status: ZigZagStatus::Mandatory,
/// };
/// let l = g.add_zigzag_link(1, 2, 1, attrs, true).unwrap();
/// let sp = ShortestPaths::compute(&g);
/// let route = RouteExpander::new(&g, &sp)
///     .unflatten(&CompactRoute::forward_only(vec![l]), RouteKind::ZigZagTour)
///     .unwrap();
///
/// let elected = ChangeZigZagDecision::new(&g).elect_mandatory(&route).unwrap();
/// assert_eq!(elected.compact().zigzag(), &[true]);
/// assert_eq!(elected.cost(), 1 + 4 + 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChangeZigZagDecision<'a> {
    graph: &'a Graph,
}

impl<'a> ChangeZigZagDecision<'a> {
    /// Creates the procedure.
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    fn status(&self, link: LinkId) -> Option<ZigZagStatus> {
        self.graph.link(link).and_then(|l| l.zigzag()).map(|z| z.status)
    }

    /// Elects a zigzag on every mandatory link of `route` that lacks one,
    /// front to back.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InfeasibleZigZag`] if a mandatory zigzag does not
    /// fit its window where the link sits in the route.
    pub fn elect_mandatory(&self, route: &Route) -> Result<Route> {
        let mut out = route.clone();
        if route.kind() != RouteKind::ZigZagTour {
            return Ok(out);
        }
        for (i, (link, _, zigzag)) in route.compact().iter().enumerate() {
            if !zigzag && self.status(link) == Some(ZigZagStatus::Mandatory) {
                out.change_zigzag(self.graph, i)?;
            }
        }
        Ok(out)
    }
}

impl IntraRouteImprovementProcedure for ChangeZigZagDecision<'_> {
    fn improve_route(&self, route: &Route) -> Result<Route> {
        let mut best = route.clone();
        if route.kind() != RouteKind::ZigZagTour {
            return Ok(best);
        }
        for (i, (link, _, _)) in route.compact().iter().enumerate() {
            if self.status(link) != Some(ZigZagStatus::Optional) {
                continue;
            }
            let mut candidate = best.clone();
            match candidate.change_zigzag(self.graph, i) {
                Ok(()) if candidate.cost() < best.cost() => best = candidate,
                Ok(()) | Err(RoutingError::InfeasibleZigZag { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        if best.cost() < route.cost() {
            debug!("zigzag decisions: {} -> {}", route.cost(), best.cost());
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::ShortestPaths;
    use crate::graph::{GraphKind, TimeWindow, ZigZagAttributes};
    use crate::route::{CompactRoute, RouteExpander};

    fn attrs(zigzag_cost: i64, window: TimeWindow, status: ZigZagStatus) -> ZigZagAttributes {
        ZigZagAttributes {
            reverse_cost: 1,
            zigzag_cost,
            service_cost: 3,
            reverse_service_cost: 3,
            window,
            status,
        }
    }

    /// Triangle 1-2-3 of zigzag links, each traversal cost 1.
    fn triangle(statuses: [ZigZagAttributes; 3]) -> Graph {
        let mut g = Graph::with_vertices(GraphKind::ZigZag, 3);
        g.add_zigzag_link(1, 2, 1, statuses[0], true).unwrap();
        g.add_zigzag_link(2, 3, 1, statuses[1], true).unwrap();
        g.add_zigzag_link(3, 1, 1, statuses[2], true).unwrap();
        g
    }

    fn tour(g: &Graph) -> Route {
        let sp = ShortestPaths::compute(g);
        RouteExpander::new(g, &sp)
            .unflatten(&CompactRoute::forward_only(vec![1, 2, 3]), RouteKind::ZigZagTour)
            .unwrap()
    }

    #[test]
    fn test_elects_only_mandatory() {
        let open = TimeWindow::unbounded();
        let g = triangle([
            attrs(5, open, ZigZagStatus::Mandatory),
            attrs(5, open, ZigZagStatus::Optional),
            attrs(5, open, ZigZagStatus::Mandatory),
        ]);
        let route = tour(&g);
        assert_eq!(route.cost(), 3 * 4);
        let elected = ChangeZigZagDecision::new(&g).elect_mandatory(&route).unwrap();
        assert_eq!(elected.compact().zigzag(), &[true, false, true]);
        assert_eq!(elected.cost(), 6 + 4 + 6);
        elected.check(&g).unwrap();
    }

    #[test]
    fn test_mandatory_outside_window_fails() {
        let late = TimeWindow::new(0, 3).unwrap();
        let open = TimeWindow::unbounded();
        let g = triangle([
            attrs(1, open, ZigZagStatus::NotAvailable),
            attrs(1, open, ZigZagStatus::NotAvailable),
            attrs(1, late, ZigZagStatus::Mandatory),
        ]);
        // The third link starts at 8, after its window closes.
        let err = ChangeZigZagDecision::new(&g).elect_mandatory(&tour(&g)).unwrap_err();
        assert!(matches!(err, RoutingError::InfeasibleZigZag { link: 3, .. }));
    }

    #[test]
    fn test_keeps_cheaper_optional_zigzags() {
        let open = TimeWindow::unbounded();
        let g = triangle([
            attrs(1, open, ZigZagStatus::Optional),
            attrs(9, open, ZigZagStatus::Optional),
            attrs(1, TimeWindow::new(0, 5).unwrap(), ZigZagStatus::Optional),
        ]);
        let route = tour(&g);
        let out = ChangeZigZagDecision::new(&g).improve_route(&route).unwrap();
        // The third zigzag would start at 6 and miss its window.
        assert_eq!(out.compact().zigzag(), &[true, false, false]);
        assert_eq!(out.cost(), route.cost() - 2);
        out.check(&g).unwrap();
    }

    #[test]
    fn test_plain_tours_pass_through() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 2);
        let l = g.add_edge(1, 2, 1, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let route = RouteExpander::new(&g, &sp)
            .unflatten(&CompactRoute::forward_only(vec![l]), RouteKind::Tour)
            .unwrap();
        let decision = ChangeZigZagDecision::new(&g);
        assert_eq!(decision.elect_mandatory(&route).unwrap(), route);
        assert_eq!(decision.improve_route(&route).unwrap(), route);
    }
}
