//! Solvers producing route collections for an [`ArcRoutingProblem`].
//!
//! - [`PostmanSolver`] — Chinese postman by T-join and Euler tour
//! - [`RuralPostmanSolver`] — Single vehicle, nearest-task order plus intra-route VND
//! - [`MinMaxKSolver`] — K vehicles, giant tour split plus iterated local search
//!
//! [`directed_connection_bound`] gives a lower bound for directed
//! instances through the arborescence oracle.

mod bounds;
mod min_max;
mod postman;
mod rural;

pub use bounds::{directed_connection_bound, ConnectionBound};
pub use min_max::MinMaxKSolver;
pub use postman::PostmanSolver;
pub use rural::RuralPostmanSolver;

use crate::constructive::nearest_task;
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::{Graph, GraphKind, LinkId};
use crate::improvement::{ChangeZigZagDecision, ImprovementConfig, IntraRouteImprovementProcedure, IntraRouteVnd};
use crate::models::ArcRoutingProblem;
use crate::route::{Route, RouteExpander, RouteKind};

/// Produces routes for a problem instance.
pub trait Solver {
    /// Solves `problem` over its `graph`.
    fn solve(&self, problem: &ArcRoutingProblem, graph: &Graph) -> Result<Vec<Route>>;

    /// Solves `problem`, or returns `Ok(None)` when it has no graph.
    fn try_solve(&self, problem: &ArcRoutingProblem) -> Result<Option<Vec<Route>>> {
        match problem.graph() {
            Some(graph) => self.solve(problem, graph).map(Some),
            None => Ok(None),
        }
    }
}

/// Route kind matching the graph variant.
pub(crate) fn tour_kind(graph: &Graph) -> RouteKind {
    match graph.kind() {
        GraphKind::ZigZag => RouteKind::ZigZagTour,
        _ => RouteKind::Tour,
    }
}

/// Single-vehicle route over `tasks`: nearest-task order, expansion with
/// the mandatory zigzags elected, then intra-route VND.
pub(crate) fn route_tasks(
    graph: &Graph,
    paths: &ShortestPaths,
    tasks: &[LinkId],
    kind: RouteKind,
    config: &ImprovementConfig,
) -> Result<Route> {
    let compact = nearest_task(graph, paths, tasks)?;
    let route = RouteExpander::new(graph, paths).unflatten(&compact, kind)?;
    let route = ChangeZigZagDecision::new(graph).elect_mandatory(&route)?;
    IntraRouteVnd::new(graph, paths, config).improve_route(&route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_solve_without_graph() {
        let problem = ArcRoutingProblem::new();
        let solver = RuralPostmanSolver::default();
        assert_eq!(solver.try_solve(&problem).unwrap(), None);
    }

    #[test]
    fn test_route_tasks_serves_every_task() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 1, true).unwrap();
        g.add_edge(2, 3, 1, true).unwrap();
        g.add_edge(3, 4, 1, true).unwrap();
        g.add_edge(4, 1, 1, false).unwrap();
        let sp = ShortestPaths::compute(&g);
        let route = route_tasks(&g, &sp, &[3, 1, 2], RouteKind::Tour, &ImprovementConfig::default()).unwrap();
        route.check(&g).unwrap();
        assert_eq!(route.cost(), 4);
        let mut links = route.compact().links().to_vec();
        links.sort_unstable();
        assert_eq!(links, vec![1, 2, 3]);
    }

    #[test]
    fn test_instances_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Graph>();
        assert_send_sync::<ShortestPaths>();
        assert_send_sync::<Route>();
        assert_send_sync::<ArcRoutingProblem>();
    }

    #[test]
    fn test_tour_kind() {
        assert_eq!(tour_kind(&Graph::new(GraphKind::ZigZag)), RouteKind::ZigZagTour);
        assert_eq!(tour_kind(&Graph::new(GraphKind::Mixed)), RouteKind::Tour);
    }
}
