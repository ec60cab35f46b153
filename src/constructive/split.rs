//! Min-max split of a giant tour into at most K closed routes.
//!
//! # Algorithm
//!
//! The giant tour's service order is kept; only the cut points are chosen.
//! `best[m][j]` is the smallest achievable worst-route cost when the first
//! `j` tasks are served by `m` routes:
//!
//! ```text
//! best[m][j] = min over i < j of max(best[m-1][i], cost(i..j))
//! ```
//!
//! where `cost(i..j)` is the depot-to-depot tour serving tasks `i..j` with
//! shortest-path deadheads. Capacity, when given, prunes segments whose
//! demand exceeds it.
//!
//! # Complexity
//!
//! O(K·n²) for n tasks.
//!
//! # Reference
//!
//! Prins, C. (2004). "A simple and effective evolutionary algorithm for the
//! vehicle routing problem", *Computers & Operations Research* 31(12),
//! 1985-2002 (the split procedure, here with a bottleneck objective).

use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::Graph;
use crate::route::CompactRoute;

/// Result of [`split_min_max`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    /// Exactly K compact routes; unused vehicles get empty routes.
    pub routes: Vec<CompactRoute>,
    /// Cost of the most expensive route.
    pub worst_cost: i64,
}

/// Splits `giant` into at most `vehicles` routes minimising the worst one.
///
/// Returns `Ok(None)` when no split respects `capacity`, or when
/// `vehicles` is zero but there are tasks to serve.
///
/// # Examples
///
/// ```
/// use u_arc_routing::constructive::split_min_max;
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::route::CompactRoute;
///
/// // Four spokes of cost 1 around the depot.
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 5);
/// for v in 2..=5 {
///     g.add_edge(1, v, 1, true).unwrap();
/// }
/// let sp = ShortestPaths::compute(&g);
/// let giant = CompactRoute::forward_only(vec![1, 2, 3, 4]);
///
/// let split = split_min_max(&g, &sp, &giant, 2, None).unwrap().unwrap();
/// assert_eq!(split.routes.len(), 2);
/// assert_eq!(split.worst_cost, 4);
/// ```
pub fn split_min_max(
    graph: &Graph,
    paths: &ShortestPaths,
    giant: &CompactRoute,
    vehicles: usize,
    capacity: Option<i64>,
) -> Result<Option<SplitResult>> {
    let n = giant.len();
    let depot = graph.depot();
    if n == 0 {
        return Ok(Some(SplitResult {
            routes: vec![CompactRoute::new(); vehicles],
            worst_cost: 0,
        }));
    }
    if vehicles == 0 {
        return Ok(None);
    }

    let mut starts = Vec::with_capacity(n);
    let mut ends = Vec::with_capacity(n);
    let mut serviced = Vec::with_capacity(n);
    let mut demand = Vec::with_capacity(n);
    for (id, forward, zigzag) in giant.iter() {
        let link = graph.require_link(id)?;
        starts.push(link.start(forward));
        ends.push(link.end(forward));
        serviced.push(link.serviced_cost(forward, zigzag));
        demand.push(link.demand());
    }

    // segment[i][j - i - 1] = cost(i..j)
    let mut segment: Vec<Vec<Option<i64>>> = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = Vec::with_capacity(n - i);
        let mut running = paths.require_distance(depot, starts[i])?;
        let mut load = 0;
        for j in i..n {
            if j > i {
                running += paths.require_distance(ends[j - 1], starts[j])?;
            }
            running += serviced[j];
            load += demand[j];
            if capacity.is_some_and(|q| load > q) {
                // Longer segments only add demand.
                row.resize(n - i, None);
                break;
            }
            row.push(Some(running + paths.require_distance(ends[j], depot)?));
        }
        segment.push(row);
    }

    let mut best = vec![vec![None::<i64>; n + 1]; vehicles + 1];
    let mut pred = vec![vec![0usize; n + 1]; vehicles + 1];
    best[0][0] = Some(0);
    for m in 1..=vehicles {
        best[m][0] = Some(0);
        for j in 1..=n {
            for i in 0..j {
                let (Some(head), Some(tail)) = (best[m - 1][i], segment[i][j - i - 1]) else {
                    continue;
                };
                let value = head.max(tail);
                if best[m][j].map_or(true, |b| value < b) {
                    best[m][j] = Some(value);
                    pred[m][j] = i;
                }
            }
        }
    }

    let Some(worst_cost) = best[vehicles][n] else {
        return Ok(None);
    };

    let mut routes = Vec::with_capacity(vehicles);
    let mut j = n;
    let mut m = vehicles;
    while j > 0 && m > 0 {
        let i = pred[m][j];
        let mut part = CompactRoute::new();
        for k in i..j {
            if let Some((id, forward, zigzag)) = giant.get(k) {
                part.push(id, forward, zigzag);
            }
        }
        routes.push(part);
        j = i;
        m -= 1;
    }
    routes.reverse();
    routes.resize(vehicles, CompactRoute::new());

    Ok(Some(SplitResult { routes, worst_cost }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphKind, LinkSpec};
    use crate::route::{RouteExpander, RouteKind};

    /// A path 1-2-3-4 with every link required.
    fn line() -> Graph {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 1, true).unwrap();
        g.add_edge(2, 3, 1, true).unwrap();
        g.add_edge(3, 4, 1, true).unwrap();
        g
    }

    #[test]
    fn test_single_vehicle_keeps_tour() {
        let g = line();
        let sp = ShortestPaths::compute(&g);
        let giant = CompactRoute::forward_only(vec![1, 2, 3]);
        let split = split_min_max(&g, &sp, &giant, 1, None).unwrap().unwrap();
        assert_eq!(split.routes, vec![giant.clone()]);
        assert_eq!(split.worst_cost, 6);
    }

    #[test]
    fn test_worst_cost_matches_expansion() {
        let g = line();
        let sp = ShortestPaths::compute(&g);
        let giant = CompactRoute::forward_only(vec![1, 2, 3]);
        let split = split_min_max(&g, &sp, &giant, 3, None).unwrap().unwrap();
        let ex = RouteExpander::new(&g, &sp);
        let worst = split
            .routes
            .iter()
            .map(|c| ex.unflatten(c, RouteKind::Tour).unwrap().cost())
            .max()
            .unwrap();
        assert_eq!(worst, split.worst_cost);
        // The last link alone already costs 6.
        assert_eq!(split.worst_cost, 6);
        let total: usize = split.routes.iter().map(CompactRoute::len).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_pads_unused_vehicles() {
        let g = line();
        let sp = ShortestPaths::compute(&g);
        let giant = CompactRoute::forward_only(vec![1]);
        let split = split_min_max(&g, &sp, &giant, 3, None).unwrap().unwrap();
        assert_eq!(split.routes.len(), 3);
        assert_eq!(split.routes.iter().filter(|r| r.is_empty()).count(), 2);
    }

    #[test]
    fn test_capacity_infeasible() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
        g.add_link(LinkSpec::edge(1, 2, 1).required(true).with_demand(5)).unwrap();
        g.add_link(LinkSpec::edge(2, 3, 1).required(true).with_demand(5)).unwrap();
        let sp = ShortestPaths::compute(&g);
        let giant = CompactRoute::forward_only(vec![1, 2]);
        assert_eq!(split_min_max(&g, &sp, &giant, 1, Some(6)).unwrap(), None);
        let split = split_min_max(&g, &sp, &giant, 2, Some(6)).unwrap().unwrap();
        assert_eq!(split.routes[0].links(), &[1]);
        assert_eq!(split.routes[1].links(), &[2]);
    }

    #[test]
    fn test_empty_giant() {
        let g = line();
        let sp = ShortestPaths::compute(&g);
        let split = split_min_max(&g, &sp, &CompactRoute::new(), 2, None).unwrap().unwrap();
        assert_eq!(split.worst_cost, 0);
        assert_eq!(split.routes.len(), 2);
    }
}
