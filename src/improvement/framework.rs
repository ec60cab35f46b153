//! Iterated local search for min-max multi-vehicle routing.
//!
//! Runs on the [`VnsRunner`] from `u-metaheur`: the runner's local search
//! is the intra-route VND followed by the inter-route VND, and its shaking
//! neighbourhoods are the perturbations (centre rotation when the graph
//! carries coordinates, then two-swap of the aggregated giant tour with a
//! fresh min-max split). The runner only ever shakes the best solution
//! found so far and the budget is a fixed number of outer iterations.

use log::{info, warn};
use rand::Rng;
use u_metaheur::vns::{VnsConfig, VnsProblem, VnsRunner};

use super::{
    ChangeZigZagDecision, ImprovementConfig, ImprovementProcedure, InterRouteVnd, IntraRouteVnd, RouteRotator,
    TwoSwapPerturb,
};
use crate::constructive::split_min_max;
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::Graph;
use crate::objective::Objective;
use crate::route::{CompactRoute, Route, RouteExpander, RouteKind};

/// Iterated local search driver.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::improvement::{ImprovementConfig, ImprovementProcedure, IteratedLocalSearch};
/// use u_arc_routing::objective::Objective;
/// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 5);
/// for v in 2..=5 {
///     g.add_edge(1, v, 1, true).unwrap();
/// }
/// let sp = ShortestPaths::compute(&g);
/// let ex = RouteExpander::new(&g, &sp);
/// let start = vec![
///     ex.unflatten(&CompactRoute::forward_only(vec![1, 2, 3, 4]), RouteKind::Tour).unwrap(),
///     ex.unflatten(&CompactRoute::new(), RouteKind::Tour).unwrap(),
/// ];
///
/// let config = ImprovementConfig::default().with_iterations(5).with_seed(1);
/// let ils = IteratedLocalSearch::new(&g, &sp, Objective::Max, 2, config);
/// let best = ils.improve_solution(&start).unwrap();
/// assert_eq!(best.iter().map(|r| r.cost()).max(), Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct IteratedLocalSearch<'a> {
    graph: &'a Graph,
    paths: &'a ShortestPaths,
    objective: Objective,
    vehicles: usize,
    capacity: Option<i64>,
    config: ImprovementConfig,
}

impl<'a> IteratedLocalSearch<'a> {
    /// Creates the driver for a fleet of `vehicles` routes.
    pub fn new(
        graph: &'a Graph,
        paths: &'a ShortestPaths,
        objective: Objective,
        vehicles: usize,
        config: ImprovementConfig,
    ) -> Self {
        Self {
            graph,
            paths,
            objective,
            vehicles,
            capacity: None,
            config,
        }
    }

    /// Bounds the serviced demand of every route.
    pub fn with_capacity(mut self, capacity: Option<i64>) -> Self {
        self.capacity = capacity;
        self
    }

    fn within_capacity(&self, routes: &[Route]) -> bool {
        self.capacity
            .map_or(true, |q| routes.iter().all(|r| r.demand(self.graph) <= q))
    }

    /// Intra-route VND on every route, then inter-route VND.
    pub fn descend(&self, routes: &[Route]) -> Result<Vec<Route>> {
        let intra = IntraRouteVnd::new(self.graph, self.paths, &self.config).improve_solution(routes)?;
        InterRouteVnd::new(self.graph, self.paths, &self.config).improve_solution(&intra)
    }

    /// Concatenates the compact forms, dropping repeated links and every
    /// zigzag election.
    fn aggregate(routes: &[Route]) -> CompactRoute {
        let mut giant = CompactRoute::new();
        let mut seen = std::collections::HashSet::new();
        for route in routes {
            for (id, forward, _) in route.compact().iter() {
                if seen.insert(id) {
                    giant.push(id, forward, false);
                }
            }
        }
        giant
    }

    /// Two-swap of the aggregated giant tour followed by a min-max split.
    ///
    /// Mandatory zigzags are elected again on every split route.
    fn swap_and_split<R: Rng>(&self, routes: &[Route], rng: &mut R) -> Result<Vec<Route>> {
        let kind = routes.first().map_or(RouteKind::Tour, Route::kind);
        let expander = RouteExpander::new(self.graph, self.paths);
        let giant = expander.unflatten(&Self::aggregate(routes), kind)?;
        let perturbed = TwoSwapPerturb::new(self.graph, self.paths, &self.config).perturb(&giant, rng)?;
        let vehicles = self.vehicles.max(routes.len());
        let Some(split) = split_min_max(self.graph, self.paths, perturbed.compact(), vehicles, self.capacity)? else {
            return Ok(routes.to_vec());
        };
        let decision = ChangeZigZagDecision::new(self.graph);
        split
            .routes
            .iter()
            .map(|c| decision.elect_mandatory(&expander.unflatten(c, kind)?))
            .collect()
    }

    fn rotator(&self) -> RouteRotator<'a> {
        RouteRotator::new(self.graph, self.paths, &self.config)
    }
}

/// Adapter handing one run to the VNS runner.
struct Search<'s, 'a> {
    ils: &'s IteratedLocalSearch<'a>,
    initial: Vec<Route>,
    rotation: bool,
}

impl Search<'_, '_> {
    fn or_keep(&self, result: Result<Vec<Route>>, fallback: &[Route], step: &str) -> Vec<Route> {
        result.unwrap_or_else(|e| {
            warn!("{} failed, keeping the current routes: {}", step, e);
            fallback.to_vec()
        })
    }
}

impl VnsProblem for Search<'_, '_> {
    type Solution = Vec<Route>;

    fn initial_solution<R: Rng>(&self, _rng: &mut R) -> Vec<Route> {
        self.initial.clone()
    }

    fn cost(&self, solution: &Vec<Route>) -> f64 {
        if !self.ils.within_capacity(solution) {
            return f64::INFINITY;
        }
        self.ils
            .objective
            .evaluate_with(self.ils.graph, self.ils.paths, solution)
    }

    fn neighborhood_count(&self) -> usize {
        if self.rotation {
            2
        } else {
            1
        }
    }

    fn shake<R: Rng>(&self, solution: &Vec<Route>, k: usize, rng: &mut R) -> Vec<Route> {
        if self.rotation && k == 0 {
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let angle = sign * self.ils.config.rotation_angle;
            let rotated = self.ils.rotator().rotate(solution, angle);
            return self.or_keep(rotated, solution, "rotation");
        }
        let swapped = self.ils.swap_and_split(solution, rng);
        self.or_keep(swapped, solution, "two-swap perturbation")
    }

    fn local_search(&self, solution: &Vec<Route>) -> Vec<Route> {
        let improved = self.or_keep(self.ils.descend(solution), solution, "local search");
        if self.ils.within_capacity(&improved) {
            improved
        } else {
            solution.clone()
        }
    }
}

impl ImprovementProcedure for IteratedLocalSearch<'_> {
    fn improve_solution(&self, routes: &[Route]) -> Result<Vec<Route>> {
        if routes.is_empty() {
            return Ok(Vec::new());
        }
        let search = Search {
            ils: self,
            initial: routes.to_vec(),
            rotation: self.rotator().applicable(routes),
        };
        let config = VnsConfig::default()
            .with_max_iterations(self.config.iterations)
            .with_max_no_improve(usize::MAX)
            .with_seed(self.config.seed);
        let result = VnsRunner::run(&search, &config);
        info!(
            "iterated local search: {} shakes, best {:.3} at iteration {}",
            result.iterations, result.best_cost, result.best_iteration
        );

        let start = search.cost(&search.initial);
        if result.best_cost < start {
            Ok(result.best)
        } else {
            Ok(routes.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;

    fn grid() -> Graph {
        let mut g = Graph::new(GraphKind::Undirected);
        for y in 0..3 {
            for x in 0..3 {
                g.add_vertex_at(x as f64, y as f64);
            }
        }
        for y in 0..3 {
            for x in 0..3 {
                let v = y * 3 + x + 1;
                if x < 2 {
                    g.add_edge(v, v + 1, 1, true).unwrap();
                }
                if y < 2 {
                    g.add_edge(v, v + 3, 1, true).unwrap();
                }
            }
        }
        g
    }

    #[test]
    fn test_aggregate_drops_repeats() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let routes = vec![
            ex.unflatten(&CompactRoute::forward_only(vec![1, 2]), RouteKind::Tour).unwrap(),
            ex.unflatten(&CompactRoute::forward_only(vec![2, 3]), RouteKind::Tour).unwrap(),
        ];
        assert_eq!(IteratedLocalSearch::aggregate(&routes).links(), &[1, 2, 3]);
    }

    #[test]
    fn test_retained_best_never_worse() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let all: Vec<usize> = g.required_links();
        let start = vec![
            ex.unflatten(&CompactRoute::forward_only(all), RouteKind::Tour).unwrap(),
            ex.unflatten(&CompactRoute::new(), RouteKind::Tour).unwrap(),
            ex.unflatten(&CompactRoute::new(), RouteKind::Tour).unwrap(),
        ];
        let before = start.iter().map(Route::cost).max().unwrap();
        let config = ImprovementConfig::default().with_iterations(3).with_seed(9);
        let ils = IteratedLocalSearch::new(&g, &sp, Objective::Max, 3, config);
        let best = ils.improve_solution(&start).unwrap();
        let after = best.iter().map(Route::cost).max().unwrap();
        assert!(after < before);
        let mut serviced: Vec<usize> = best.iter().flat_map(|r| r.compact().links().to_vec()).collect();
        serviced.sort_unstable();
        assert_eq!(serviced, g.required_links());
        for r in &best {
            r.check(&g).unwrap();
        }
    }

    #[test]
    fn test_swap_and_split_keeps_fleet() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let start = vec![
            ex.unflatten(&CompactRoute::forward_only(vec![1, 2, 3, 4]), RouteKind::Tour).unwrap(),
            ex.unflatten(&CompactRoute::forward_only(vec![5, 6]), RouteKind::Tour).unwrap(),
        ];
        let ils = IteratedLocalSearch::new(&g, &sp, Objective::Max, 2, ImprovementConfig::default());
        let mut rng = u_numflow::random::create_rng(5);
        let out = ils.swap_and_split(&start, &mut rng).unwrap();
        assert_eq!(out.len(), 2);
        let total: usize = out.iter().map(|r| r.compact().len()).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_empty_solution() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let ils = IteratedLocalSearch::new(&g, &sp, Objective::Max, 2, ImprovementConfig::default());
        assert!(ils.improve_solution(&[]).unwrap().is_empty());
    }
}
