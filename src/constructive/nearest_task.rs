//! Greedy nearest-task construction.
//!
//! # Algorithm
//!
//! Starting at the depot, repeatedly service the unvisited task whose start
//! vertex (in either direction for undirected links) is closest to the
//! current position, then continue from its end. Ties go to the cheaper
//! serviced cost, then to the lower link id.
//!
//! # Complexity
//!
//! O(t²) oracle lookups for t tasks.

use crate::distance::ShortestPaths;
use crate::error::{Result, RoutingError};
use crate::graph::{Graph, LinkId};
use crate::route::CompactRoute;

/// Orders `tasks` into one compact route by nearest-task insertion.
///
/// # Errors
///
/// [`RoutingError::UnknownLink`] for a missing task and
/// [`RoutingError::Disconnected`] when a task cannot be reached.
///
/// # Examples
///
/// ```
/// use u_arc_routing::constructive::nearest_task;
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 4);
/// let far = g.add_edge(3, 4, 1, true).unwrap();
/// let near = g.add_edge(1, 2, 1, true).unwrap();
/// g.add_edge(2, 3, 1, false).unwrap();
/// let sp = ShortestPaths::compute(&g);
///
/// let route = nearest_task(&g, &sp, &[far, near]).unwrap();
/// assert_eq!(route.links(), &[near, far]);
/// ```
pub fn nearest_task(graph: &Graph, paths: &ShortestPaths, tasks: &[LinkId]) -> Result<CompactRoute> {
    let mut remaining: Vec<LinkId> = tasks.to_vec();
    remaining.sort_unstable();
    remaining.dedup();
    let mut route = CompactRoute::new();
    let mut at = graph.depot();

    while !remaining.is_empty() {
        // (distance, serviced cost, link id, index, forward)
        let mut best: Option<(i64, i64, LinkId, usize, bool)> = None;
        for (idx, &id) in remaining.iter().enumerate() {
            let link = graph.require_link(id)?;
            let directions: &[bool] = if link.is_directed() { &[true] } else { &[true, false] };
            for &forward in directions {
                let Some(reach) = paths.distance(at, link.start(forward)) else {
                    continue;
                };
                let key = (reach, link.serviced_cost(forward, false), id, idx, forward);
                if best.map_or(true, |b| (key.0, key.1, key.2) < (b.0, b.1, b.2)) {
                    best = Some(key);
                }
            }
        }
        let Some((_, _, id, idx, forward)) = best else {
            let link = graph.require_link(remaining[0])?;
            return Err(RoutingError::Disconnected {
                from: at,
                to: link.first(),
            });
        };
        route.push(id, forward, false);
        at = graph.require_link(id)?.end(forward);
        remaining.swap_remove(idx);
    }
    Ok(route)
}

/// Nearest-task ordering of every required link of the graph.
pub fn giant_tour(graph: &Graph, paths: &ShortestPaths) -> Result<CompactRoute> {
    nearest_task(graph, paths, &graph.required_links())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;
    use crate::route::{RouteExpander, RouteKind};

    #[test]
    fn test_visits_every_task_once() {
        let mut g = Graph::with_vertices(GraphKind::Windy, 5);
        for (i, j) in [(1, 2), (2, 3), (3, 4), (4, 5), (5, 1), (2, 4)] {
            g.add_windy_edge(i, j, 2, 3, true).unwrap();
        }
        let sp = ShortestPaths::compute(&g);
        let route = giant_tour(&g, &sp).unwrap();
        let mut links = route.links().to_vec();
        links.sort_unstable();
        assert_eq!(links, g.required_links());
        RouteExpander::new(&g, &sp).unflatten(&route, RouteKind::Tour).unwrap();
    }

    #[test]
    fn test_prefers_reverse_when_closer() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 5, false).unwrap();
        let t = g.add_edge(3, 1, 1, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let route = nearest_task(&g, &sp, &[t]).unwrap();
        assert_eq!(route.forward(), &[false]);
    }

    #[test]
    fn test_unreachable_task() {
        let mut g = Graph::with_vertices(GraphKind::Directed, 3);
        g.add_arc(2, 1, 1, false).unwrap();
        let t = g.add_arc(2, 3, 1, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        assert!(matches!(
            nearest_task(&g, &sp, &[t]),
            Err(RoutingError::Disconnected { from: 1, .. })
        ));
    }

    #[test]
    fn test_empty_tasks() {
        let g = Graph::with_vertices(GraphKind::Undirected, 1);
        let sp = ShortestPaths::compute(&g);
        assert!(nearest_task(&g, &sp, &[]).unwrap().is_empty());
    }
}
