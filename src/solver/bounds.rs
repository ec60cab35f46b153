//! Lower bound for directed rural postman instances.
//!
//! Every tour must service the required arcs and link their weakly
//! connected components to the depot. Contracting each component to a node
//! and weighting `u → v` by the cheapest shortest path from any vertex of
//! `u` to any vertex of `v`, a minimum spanning arborescence rooted at the
//! depot's component bounds the connection cost from below.

use log::debug;

use crate::algorithms::{link_components, ArborescenceOracle};
use crate::distance::{ShortestPaths, UNREACHABLE};
use crate::error::Result;
use crate::graph::{Graph, VertexId};

/// Result of [`directed_connection_bound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionBound {
    /// Components of the required arcs; the depot forms its own if no
    /// required arc touches it.
    pub components: Vec<Vec<VertexId>>,
    /// Source-major component weights handed to the oracle.
    pub weights: Vec<i64>,
    /// Index of the depot component.
    pub root: usize,
    /// Parent of every component in the arborescence.
    pub parents: Vec<Option<usize>>,
    /// Weight of the arborescence.
    pub connection_cost: i64,
    /// Traversal cost of the required arcs.
    pub required_cost: i64,
}

impl ConnectionBound {
    /// The lower bound itself.
    pub fn value(&self) -> i64 {
        self.required_cost + self.connection_cost
    }
}

/// Builds the component digraph and solves it with `oracle`.
///
/// # Errors
///
/// Whatever `oracle` reports, in particular when some component cannot be
/// reached from the depot.
///
/// # Examples
///
/// ```
/// use u_arc_routing::algorithms::ChuLiuEdmonds;
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::solver::directed_connection_bound;
///
/// let mut g = Graph::with_vertices(GraphKind::Directed, 4);
/// g.add_arc(1, 2, 1, true).unwrap();
/// g.add_arc(2, 3, 4, false).unwrap();
/// g.add_arc(3, 4, 1, true).unwrap();
/// g.add_arc(4, 1, 4, false).unwrap();
/// let sp = ShortestPaths::compute(&g);
///
/// let bound = directed_connection_bound(&g, &sp, &ChuLiuEdmonds).unwrap();
/// assert_eq!(bound.components.len(), 2);
/// assert_eq!(bound.connection_cost, 4);
/// assert_eq!(bound.value(), 6);
/// ```
pub fn directed_connection_bound(
    graph: &Graph,
    paths: &ShortestPaths,
    oracle: &dyn ArborescenceOracle,
) -> Result<ConnectionBound> {
    let required = graph.required_links();
    let depot = graph.depot();
    let mut components = link_components(graph, &required);
    let root = match components.iter().position(|c| c.contains(&depot)) {
        Some(i) => i,
        None => {
            components.insert(0, vec![depot]);
            0
        }
    };

    let n = components.len();
    let mut weights = vec![UNREACHABLE; n * n];
    for (u, from) in components.iter().enumerate() {
        for (v, to) in components.iter().enumerate() {
            if u == v {
                continue;
            }
            let best = from
                .iter()
                .flat_map(|&a| to.iter().filter_map(move |&b| paths.distance(a, b)))
                .min();
            if let Some(w) = best {
                weights[u * n + v] = w;
            }
        }
    }

    let parents = oracle.min_arborescence(n, root, &weights)?;
    let connection_cost = parents
        .iter()
        .enumerate()
        .filter_map(|(v, p)| p.map(|p| weights[p * n + v]))
        .sum();
    let required_cost = required
        .iter()
        .filter_map(|&id| graph.link(id))
        .map(|l| l.traversal_cost(true))
        .sum();
    debug!("connection bound over {} components: {}", n, connection_cost);

    Ok(ConnectionBound {
        components,
        weights,
        root,
        parents,
        connection_cost,
        required_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ChuLiuEdmonds;
    use crate::graph::GraphKind;
    use crate::models::ArcRoutingProblem;
    use crate::solver::{RuralPostmanSolver, Solver};

    #[test]
    fn test_depot_outside_required() {
        let mut g = Graph::with_vertices(GraphKind::Directed, 3);
        g.add_arc(1, 2, 3, false).unwrap();
        g.add_arc(2, 3, 1, true).unwrap();
        g.add_arc(3, 1, 2, false).unwrap();
        let sp = ShortestPaths::compute(&g);
        let bound = directed_connection_bound(&g, &sp, &ChuLiuEdmonds).unwrap();
        assert_eq!(bound.components, vec![vec![1], vec![2, 3]]);
        assert_eq!(bound.root, 0);
        assert_eq!(bound.parents, vec![None, Some(0)]);
        assert_eq!(bound.connection_cost, 3);
        assert_eq!(bound.value(), 4);
    }

    #[test]
    fn test_bound_below_heuristic() {
        let mut g = Graph::with_vertices(GraphKind::Directed, 5);
        g.add_arc(1, 2, 2, true).unwrap();
        g.add_arc(2, 3, 3, false).unwrap();
        g.add_arc(3, 4, 2, true).unwrap();
        g.add_arc(4, 5, 1, false).unwrap();
        g.add_arc(5, 1, 2, true).unwrap();
        g.add_arc(4, 1, 6, false).unwrap();
        let sp = ShortestPaths::compute(&g);
        let bound = directed_connection_bound(&g, &sp, &ChuLiuEdmonds).unwrap();
        let problem = ArcRoutingProblem::new().with_graph(g);
        let routes = RuralPostmanSolver::default().try_solve(&problem).unwrap().unwrap();
        assert!(bound.value() <= routes[0].cost());
    }
}
