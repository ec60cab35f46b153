//! Chinese postman by odd-vertex restoration and an Euler tour.
//!
//! # Algorithm
//!
//! 1. Pair the odd vertices of the required subgraph with the matching
//!    oracle, weights being shortest-path distances.
//! 2. Build an augmented multigraph: every required link once, plus one
//!    deadhead copy of each link on the matched shortest paths.
//! 3. Walk an Euler tour of the augmented graph from the depot and replay
//!    it on the original graph, servicing each required link on its first
//!    traversal.
//!
//! Exact for undirected graphs whose required links form one component
//! containing the depot. Any other instance goes to the
//! [`RuralPostmanSolver`].

use log::{debug, info};

use super::{RuralPostmanSolver, Solver};
use crate::algorithms::{euler_tour, link_components, parity_paths, MatchingOracle, ReferenceMatching};
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::{DegreeUpdatePolicy, Graph, GraphKind, LinkId};
use crate::improvement::ImprovementConfig;
use crate::models::ArcRoutingProblem;
use crate::route::Route;

/// Chinese postman solver with a rural postman fallback.
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::models::ArcRoutingProblem;
/// use u_arc_routing::solver::{PostmanSolver, Solver};
///
/// // A triangle with a pendant edge: vertices 3 and 4 are odd.
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 4);
/// g.add_edge(1, 2, 1, true).unwrap();
/// g.add_edge(2, 3, 1, true).unwrap();
/// g.add_edge(3, 1, 1, true).unwrap();
/// g.add_edge(3, 4, 2, true).unwrap();
/// let problem = ArcRoutingProblem::new().with_graph(g);
///
/// let routes = PostmanSolver::default().try_solve(&problem).unwrap().unwrap();
/// assert_eq!(routes[0].cost(), 3 + 2 * 2);
/// assert!(problem.is_feasible(&routes));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostmanSolver {
    fallback: RuralPostmanSolver,
}

impl PostmanSolver {
    /// Creates the solver; `config` drives the fallback.
    pub fn new(config: ImprovementConfig) -> Self {
        Self {
            fallback: RuralPostmanSolver::new(config),
        }
    }

    /// `true` if the instance is solved exactly rather than by the fallback.
    pub fn is_exact(graph: &Graph) -> bool {
        if graph.kind() != GraphKind::Undirected {
            return false;
        }
        let required = graph.required_links();
        if required.is_empty() {
            return true;
        }
        let components = link_components(graph, &required);
        components.len() == 1 && components[0].contains(&graph.depot())
    }

    /// Builds the postman tour with the in-process matching oracle.
    pub fn solve_with(&self, graph: &Graph, paths: &ShortestPaths) -> Result<Route> {
        self.solve_with_oracle(graph, paths, &ReferenceMatching)
    }

    /// Builds the postman tour, pairing odd vertices with `oracle`.
    pub fn solve_with_oracle(
        &self,
        graph: &Graph,
        paths: &ShortestPaths,
        oracle: &dyn MatchingOracle,
    ) -> Result<Route> {
        if !Self::is_exact(graph) {
            debug!("postman: {} graph not eligible, using the rural fallback", graph.kind().name());
            return self.fallback.solve_with(graph, paths);
        }
        let depot = graph.depot();
        let required = graph.required_links();
        if required.is_empty() {
            return Ok(Route::tour(depot));
        }

        // origin[copy id - 1] = (source id, serviced)
        let mut augmented = Graph::with_vertices(GraphKind::Undirected, graph.num_vertices());
        let mut origin: Vec<(LinkId, bool)> = Vec::new();
        for &id in &required {
            let link = graph.require_link(id)?;
            augmented.add_edge(link.first(), link.second(), link.cost(), true)?;
            origin.push((id, true));
        }
        let duplicated = parity_paths(graph, paths, &required, oracle)?;
        for &id in duplicated.iter().flatten() {
            let link = graph.require_link(id)?;
            augmented.add_edge(link.first(), link.second(), link.cost(), false)?;
            origin.push((id, false));
        }

        let mut route = Route::tour(depot);
        for (copy, forward) in euler_tour(&augmented, depot)? {
            let (source, serviced) = origin[copy - 1];
            route.append_link_directed(graph, source, forward, serviced, false)?;
        }
        info!(
            "postman tour: {} required links, {} deadheads, cost {}",
            required.len(),
            origin.len() - required.len(),
            route.cost()
        );
        Ok(route)
    }
}

impl Solver for PostmanSolver {
    fn solve(&self, _problem: &ArcRoutingProblem, graph: &Graph) -> Result<Vec<Route>> {
        let paths = ShortestPaths::compute(graph);
        Ok(vec![self.solve_with(graph, &paths)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eulerian_graph_needs_no_deadheads() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 4);
        for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 1)] {
            g.add_edge(a, b, 2, true).unwrap();
        }
        let problem = ArcRoutingProblem::new().with_graph(g);
        let routes = PostmanSolver::default().try_solve(&problem).unwrap().unwrap();
        assert_eq!(routes[0].cost(), 8);
        assert_eq!(routes[0].len(), 4);
        assert!(problem.is_feasible(&routes));
    }

    #[test]
    fn test_path_graph_doubles_every_edge() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 3, true).unwrap();
        g.add_edge(2, 3, 4, true).unwrap();
        let problem = ArcRoutingProblem::new().with_graph(g);
        let routes = PostmanSolver::default().try_solve(&problem).unwrap().unwrap();
        assert_eq!(routes[0].cost(), 14);
        assert_eq!(routes[0].compact().len(), 2);
        routes[0].check(problem.graph().unwrap()).unwrap();
    }

    #[test]
    fn test_deadheads_through_unrequired_links() {
        // Required 1-2 and 1-3; the cheap connector 2-3 is optional.
        let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 5, true).unwrap();
        g.add_edge(1, 3, 5, true).unwrap();
        g.add_edge(2, 3, 1, false).unwrap();
        let sp = ShortestPaths::compute(&g);
        let route = PostmanSolver::default().solve_with(&g, &sp).unwrap();
        assert_eq!(route.cost(), 11);
        assert_eq!(route.compact().len(), 2);
    }

    #[test]
    fn test_fallback_for_directed() {
        let mut g = Graph::with_vertices(GraphKind::Directed, 2);
        g.add_arc(1, 2, 1, true).unwrap();
        g.add_arc(2, 1, 1, false).unwrap();
        assert!(!PostmanSolver::is_exact(&g));
        let problem = ArcRoutingProblem::new().with_graph(g);
        let routes = PostmanSolver::default().try_solve(&problem).unwrap().unwrap();
        assert_eq!(routes[0].cost(), 2);
    }

    #[test]
    fn test_disjoint_required_not_exact() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 1, true).unwrap();
        g.add_edge(2, 3, 1, false).unwrap();
        g.add_edge(3, 4, 1, true).unwrap();
        assert!(!PostmanSolver::is_exact(&g));
        let problem = ArcRoutingProblem::new().with_graph(g);
        let routes = PostmanSolver::default().try_solve(&problem).unwrap().unwrap();
        assert!(problem.is_feasible(&routes));
    }
}
