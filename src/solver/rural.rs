//! Single-vehicle rural postman heuristic.

use log::info;

use super::{route_tasks, tour_kind, Solver};
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::Graph;
use crate::improvement::ImprovementConfig;
use crate::models::ArcRoutingProblem;
use crate::route::Route;

/// Serves every required link with one tour.
///
/// Tasks are ordered by nearest-task insertion from the depot, expanded with
/// shortest-path deadheads and then improved by the intra-route VND. Works
/// on every graph variant.
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::models::ArcRoutingProblem;
/// use u_arc_routing::solver::{RuralPostmanSolver, Solver};
///
/// let mut g = Graph::with_vertices(GraphKind::Directed, 3);
/// g.add_arc(1, 2, 2, true).unwrap();
/// g.add_arc(2, 3, 2, false).unwrap();
/// g.add_arc(3, 1, 2, false).unwrap();
/// let problem = ArcRoutingProblem::new().with_graph(g);
///
/// let routes = RuralPostmanSolver::default().try_solve(&problem).unwrap().unwrap();
/// assert_eq!(routes.len(), 1);
/// assert_eq!(routes[0].cost(), 6);
/// assert!(problem.is_feasible(&routes));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuralPostmanSolver {
    config: ImprovementConfig,
}

impl RuralPostmanSolver {
    /// Creates the solver with the given descent settings.
    pub fn new(config: ImprovementConfig) -> Self {
        Self { config }
    }

    /// Builds the tour with an existing shortest-path snapshot.
    pub fn solve_with(&self, graph: &Graph, paths: &ShortestPaths) -> Result<Route> {
        let tasks = graph.required_links();
        let route = route_tasks(graph, paths, &tasks, tour_kind(graph), &self.config)?;
        info!("rural postman tour: {} tasks, cost {}", tasks.len(), route.cost());
        Ok(route)
    }
}

impl Solver for RuralPostmanSolver {
    fn solve(&self, _problem: &ArcRoutingProblem, graph: &Graph) -> Result<Vec<Route>> {
        let paths = ShortestPaths::compute(graph);
        Ok(vec![self.solve_with(graph, &paths)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphKind, TimeWindow, ZigZagAttributes, ZigZagStatus};

    #[test]
    fn test_windy_tour() {
        let mut g = Graph::with_vertices(GraphKind::Windy, 3);
        g.add_windy_edge(1, 2, 1, 5, true).unwrap();
        g.add_windy_edge(2, 3, 5, 1, true).unwrap();
        g.add_windy_edge(3, 1, 1, 1, false).unwrap();
        let problem = ArcRoutingProblem::new().with_graph(g);
        let routes = RuralPostmanSolver::default().try_solve(&problem).unwrap().unwrap();
        assert!(problem.is_feasible(&routes));
        // Every closed walk leaves vertex 2 at cost 5.
        assert_eq!(routes[0].cost(), 7);
    }

    #[test]
    fn test_mandatory_zigzag_elected() {
        let mut g = Graph::with_vertices(GraphKind::ZigZag, 3);
        let attrs = |status| ZigZagAttributes {
            reverse_cost: 2,
            zigzag_cost: 3,
            service_cost: 1,
            reverse_service_cost: 1,
            window: TimeWindow::unbounded(),
            status,
        };
        let zz = g.add_zigzag_link(1, 2, 2, attrs(ZigZagStatus::Mandatory), true).unwrap();
        g.add_zigzag_link(2, 3, 2, attrs(ZigZagStatus::Optional), true).unwrap();
        g.add_zigzag_link(3, 1, 2, attrs(ZigZagStatus::NotAvailable), true).unwrap();
        let problem = ArcRoutingProblem::new().with_graph(g);
        let routes = RuralPostmanSolver::default().try_solve(&problem).unwrap().unwrap();
        assert!(problem.violations(&routes).is_empty());
        assert!(problem.is_feasible(&routes));
        let route = &routes[0];
        let at = route.compact().links().iter().position(|&l| l == zz).unwrap();
        assert!(route.compact().zigzag()[at]);
    }

    #[test]
    fn test_no_required_links() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 2);
        g.add_edge(1, 2, 1, false).unwrap();
        let problem = ArcRoutingProblem::new().with_graph(g);
        let routes = RuralPostmanSolver::default().try_solve(&problem).unwrap().unwrap();
        assert!(routes[0].is_empty());
        assert_eq!(routes[0].cost(), 0);
    }
}
