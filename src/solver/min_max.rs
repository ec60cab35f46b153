//! Min-max K-vehicle arc routing.

use log::info;

use super::{tour_kind, Solver};
use crate::constructive::{giant_tour, split_min_max};
use crate::distance::ShortestPaths;
use crate::error::{Result, RoutingError};
use crate::graph::Graph;
use crate::improvement::{ChangeZigZagDecision, ImprovementConfig, ImprovementProcedure, IteratedLocalSearch};
use crate::models::ArcRoutingProblem;
use crate::route::{Route, RouteExpander};

/// Giant tour, min-max split into the fleet, then iterated local search.
///
/// The result always has exactly `fleet_size` routes; vehicles without work
/// get empty tours.
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::improvement::ImprovementConfig;
/// use u_arc_routing::models::ArcRoutingProblem;
/// use u_arc_routing::solver::{MinMaxKSolver, Solver};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 5);
/// for v in 2..=5 {
///     g.add_edge(1, v, 1, true).unwrap();
/// }
/// let problem = ArcRoutingProblem::new().with_graph(g).with_fleet_size(2);
///
/// let solver = MinMaxKSolver::new(ImprovementConfig::default().with_iterations(5));
/// let routes = solver.try_solve(&problem).unwrap().unwrap();
/// assert_eq!(routes.len(), 2);
/// assert!(routes.iter().all(|r| r.cost() == 4));
/// assert!(problem.is_feasible(&routes));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MinMaxKSolver {
    config: ImprovementConfig,
}

impl MinMaxKSolver {
    /// Creates the solver with the given search settings.
    pub fn new(config: ImprovementConfig) -> Self {
        Self { config }
    }

    /// Routes before local search: the split of the nearest-task giant tour,
    /// with the mandatory zigzags elected.
    pub fn initial_routes(
        &self,
        problem: &ArcRoutingProblem,
        graph: &Graph,
        paths: &ShortestPaths,
    ) -> Result<Vec<Route>> {
        let giant = giant_tour(graph, paths)?;
        let vehicles = problem.fleet_size();
        let split = split_min_max(graph, paths, &giant, vehicles, problem.capacity())?.ok_or(
            RoutingError::InfeasibleSplit {
                vehicles,
                capacity: problem.capacity(),
            },
        )?;
        let expander = RouteExpander::new(graph, paths);
        let decision = ChangeZigZagDecision::new(graph);
        let kind = tour_kind(graph);
        split
            .routes
            .iter()
            .map(|c| decision.elect_mandatory(&expander.unflatten(c, kind)?))
            .collect()
    }
}

impl Solver for MinMaxKSolver {
    fn solve(&self, problem: &ArcRoutingProblem, graph: &Graph) -> Result<Vec<Route>> {
        let paths = ShortestPaths::compute(graph);
        let initial = self.initial_routes(problem, graph, &paths)?;
        let objective = problem.objective();
        let start = objective.evaluate_with(graph, &paths, &initial);

        let search = IteratedLocalSearch::new(graph, &paths, objective, problem.fleet_size(), self.config.clone())
            .with_capacity(problem.capacity());
        let routes = search.improve_solution(&initial)?;
        info!(
            "min-max split {:.3}, after search {:.3}",
            start,
            objective.evaluate_with(graph, &paths, &routes)
        );
        Ok(routes)
    }
}
