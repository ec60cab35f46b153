//! Objective functions over route collections.
//!
//! Every objective is minimised. [`Objective::AverageTraversal`] is the only
//! variant that needs pairwise distances; [`Objective::evaluate`] computes
//! the oracle once per call, [`Objective::evaluate_with`] reuses a snapshot.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::distance::ShortestPaths;
use crate::graph::{Graph, VertexId};
use crate::route::Route;

/// How a route collection is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Objective {
    /// Total cost of all routes.
    Sum,
    /// Cost of the most expensive route.
    #[default]
    Max,
    /// Percentage by which the worst route exceeds the mean route cost.
    Deviation,
    /// Normalised count of vertices shared between routes.
    RouteOverlap,
    /// Mean shortest distance between tasks serviced by the same route.
    AverageTraversal,
}

impl Objective {
    /// Scores `routes`, computing shortest paths only when needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_arc_routing::distance::ShortestPaths;
    /// use u_arc_routing::graph::{Graph, GraphKind};
    /// use u_arc_routing::objective::Objective;
    /// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
    ///
    /// let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
    /// g.add_edge(1, 2, 1, true).unwrap();
    /// g.add_edge(1, 3, 3, true).unwrap();
    /// let sp = ShortestPaths::compute(&g);
    /// let ex = RouteExpander::new(&g, &sp);
    /// let routes = vec![
    ///     ex.unflatten(&CompactRoute::forward_only(vec![1]), RouteKind::Tour).unwrap(),
    ///     ex.unflatten(&CompactRoute::forward_only(vec![2]), RouteKind::Tour).unwrap(),
    /// ];
    /// assert_eq!(Objective::Sum.evaluate(&g, &routes), 8.0);
    /// assert_eq!(Objective::Max.evaluate(&g, &routes), 6.0);
    /// assert_eq!(Objective::Deviation.evaluate(&g, &routes), 50.0);
    /// ```
    pub fn evaluate(&self, graph: &Graph, routes: &[Route]) -> f64 {
        match self {
            Objective::AverageTraversal => {
                let paths = ShortestPaths::compute(graph);
                average_traversal(graph, &paths, routes)
            }
            _ => self.evaluate_without_paths(graph, routes),
        }
    }

    /// Scores `routes` with a precomputed snapshot.
    pub fn evaluate_with(&self, graph: &Graph, paths: &ShortestPaths, routes: &[Route]) -> f64 {
        match self {
            Objective::AverageTraversal => average_traversal(graph, paths, routes),
            _ => self.evaluate_without_paths(graph, routes),
        }
    }

    fn evaluate_without_paths(&self, graph: &Graph, routes: &[Route]) -> f64 {
        match self {
            Objective::Sum => routes.iter().map(|r| r.cost() as f64).sum(),
            Objective::Max => worst(routes),
            Objective::Deviation => deviation(routes),
            Objective::RouteOverlap => route_overlap(graph, routes),
            Objective::AverageTraversal => f64::INFINITY,
        }
    }

    /// Orders two scores; smaller is better. NaN sorts last.
    pub fn compare(a: f64, b: f64) -> Ordering {
        a.total_cmp(&b)
    }

    /// `true` if `a` is strictly better than `b`.
    pub fn is_better(a: f64, b: f64) -> bool {
        Self::compare(a, b) == Ordering::Less
    }

    /// `true` if the score can be used to rank solutions.
    pub fn is_well_defined(value: f64) -> bool {
        value.is_finite()
    }
}

fn worst(routes: &[Route]) -> f64 {
    routes.iter().map(Route::cost).max().unwrap_or(0) as f64
}

fn deviation(routes: &[Route]) -> f64 {
    if routes.is_empty() {
        return 0.0;
    }
    let total: i64 = routes.iter().map(Route::cost).sum();
    let mean = total as f64 / routes.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    100.0 * (worst(routes) / mean - 1.0)
}

fn endpoints(graph: &Graph, links: &[usize]) -> HashSet<VertexId> {
    links
        .iter()
        .filter_map(|&l| graph.link(l))
        .flat_map(|l| [l.first(), l.second()])
        .collect()
}

/// `(NO - N) / ((sqrt(R) + sqrt(N) - 1)^2 - N)` where `NO` sums each route's
/// distinct serviced endpoints and `N` counts the required endpoints.
fn route_overlap(graph: &Graph, routes: &[Route]) -> f64 {
    let n = endpoints(graph, &graph.required_links()).len() as f64;
    let no: usize = routes
        .iter()
        .map(|r| endpoints(graph, r.compact().links()).len())
        .sum();
    let r = routes.len() as f64;
    let denominator = (r.sqrt() + n.sqrt() - 1.0).powi(2) - n;
    if denominator == 0.0 {
        return 0.0;
    }
    (no as f64 - n) / denominator
}

fn task_distance(graph: &Graph, paths: &ShortestPaths, a: usize, b: usize) -> Option<i64> {
    let (la, lb) = (graph.link(a)?, graph.link(b)?);
    let mut best = None::<i64>;
    for u in [la.first(), la.second()] {
        for v in [lb.first(), lb.second()] {
            let Some(d) = paths.distance(u, v) else { continue };
            best = Some(best.map_or(d, |b| b.min(d)));
        }
    }
    best
}

/// Sum of nearest-endpoint distances over ordered pairs of tasks sharing a
/// route, divided by `t (t - R) / (2R)` for `t` tasks on `R` routes.
fn average_traversal(graph: &Graph, paths: &ShortestPaths, routes: &[Route]) -> f64 {
    let mut total = 0i64;
    let mut tasks = 0usize;
    for route in routes {
        let links = route.compact().links();
        tasks += links.len();
        for (i, &a) in links.iter().enumerate() {
            for (j, &b) in links.iter().enumerate() {
                if i == j || a == b {
                    continue;
                }
                match task_distance(graph, paths, a, b) {
                    Some(d) => total = total.saturating_add(d),
                    None => return f64::INFINITY,
                }
            }
        }
    }
    let r = routes.len() as f64;
    if r == 0.0 {
        return 0.0;
    }
    let t = tasks as f64;
    let denominator = t * (t - r) / (2.0 * r);
    if denominator <= 0.0 {
        return 0.0;
    }
    total as f64 / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;
    use crate::route::{CompactRoute, RouteExpander, RouteKind};

    /// Path 1-2-3-4 with unit required edges.
    fn line() -> Graph {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 1, true).unwrap();
        g.add_edge(2, 3, 1, true).unwrap();
        g.add_edge(3, 4, 1, true).unwrap();
        g
    }

    fn routes(g: &Graph, sp: &ShortestPaths, parts: &[&[usize]]) -> Vec<Route> {
        let ex = RouteExpander::new(g, sp);
        parts
            .iter()
            .map(|p| ex.unflatten(&CompactRoute::forward_only(p.to_vec()), RouteKind::Tour).unwrap())
            .collect()
    }

    #[test]
    fn test_sum_and_max() {
        let g = line();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[&[1, 2], &[3]]);
        assert_eq!(Objective::Sum.evaluate(&g, &rs), 4.0 + 6.0);
        assert_eq!(Objective::Max.evaluate(&g, &rs), 6.0);
        assert_eq!(Objective::Max.evaluate(&g, &[]), 0.0);
    }

    #[test]
    fn test_deviation_balanced_is_zero() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 2, true).unwrap();
        g.add_edge(1, 3, 2, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[&[1], &[2]]);
        assert_eq!(Objective::Deviation.evaluate(&g, &rs), 0.0);
        let empty = routes(&g, &sp, &[&[], &[]]);
        assert_eq!(Objective::Deviation.evaluate(&g, &empty), 0.0);
    }

    #[test]
    fn test_route_overlap() {
        let g = line();
        let sp = ShortestPaths::compute(&g);
        // N = 4 endpoints; split routes share vertex 3 so NO = 3 + 2.
        let rs = routes(&g, &sp, &[&[1, 2], &[3]]);
        let expected = (5.0 - 4.0) / ((2f64.sqrt() + 1.0).powi(2) - 4.0);
        assert!((Objective::RouteOverlap.evaluate(&g, &rs) - expected).abs() < 1e-12);
        // One route covering everything has no overlap.
        let single = routes(&g, &sp, &[&[1, 2, 3]]);
        assert_eq!(Objective::RouteOverlap.evaluate(&g, &single), 0.0);
    }

    #[test]
    fn test_average_traversal() {
        let g = line();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[&[1, 3], &[2]]);
        // Links 1 and 3 are one apart (vertices 2 and 3), counted both ways.
        let denominator = 3.0 * (3.0 - 2.0) / 4.0;
        assert_eq!(Objective::AverageTraversal.evaluate(&g, &rs), 2.0 / denominator);
        assert_eq!(
            Objective::AverageTraversal.evaluate_with(&g, &sp, &rs),
            Objective::AverageTraversal.evaluate(&g, &rs)
        );
    }

    #[test]
    fn test_average_traversal_degenerate() {
        let g = line();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[&[1], &[2], &[3]]);
        assert_eq!(Objective::AverageTraversal.evaluate(&g, &rs), 0.0);
    }

    #[test]
    fn test_compare() {
        assert_eq!(Objective::compare(1.0, 2.0), Ordering::Less);
        assert!(Objective::is_better(1.0, 2.0));
        assert!(!Objective::is_better(2.0, 2.0));
        assert!(Objective::is_better(5.0, f64::NAN));
        assert!(!Objective::is_well_defined(f64::INFINITY));
    }

    #[test]
    fn test_default_is_min_max() {
        assert_eq!(Objective::default(), Objective::Max);
    }
}
