//! Optimal orientation of the serviced links of a fixed sequence.
//!
//! # Algorithm
//!
//! With the service order fixed, only the direction of each link is free.
//! A two-state dynamic program over positions (forward / backward) keeps
//! the cheapest cost of reaching the end of each link in each direction:
//!
//! ```text
//! best[i][d] = min over e of best[i-1][e] + dist(end(i-1, e), start(i, d)) + serviced(i, d)
//! ```
//!
//! and closes with the return to the depot. O(m) per route.

use log::debug;

use super::IntraRouteImprovementProcedure;
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::{Graph, VertexId};
use crate::route::{CompactRoute, Route, RouteExpander};

/// Re-orients serviced links optimally for the current order.
#[derive(Debug, Clone, Copy)]
pub struct Reversal<'a> {
    graph: &'a Graph,
    paths: &'a ShortestPaths,
}

impl<'a> Reversal<'a> {
    /// Creates the procedure.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths) -> Self {
        Self { graph, paths }
    }

    /// Cheapest orientation vector for `compact`, with its expanded cost.
    pub fn orient(&self, compact: &CompactRoute) -> Result<(Vec<bool>, i64)> {
        let depot = self.graph.depot();
        let m = compact.len();
        if m == 0 {
            return Ok((Vec::new(), 0));
        }
        // best[d] is the cost of ending the current link in direction d;
        // index 0 = forward, 1 = backward.
        let mut best = [i64::MAX; 2];
        let mut came_from: Vec<[usize; 2]> = Vec::with_capacity(m);
        let mut ends: [VertexId; 2] = [depot, depot];

        for (i, (id, _, zigzag)) in compact.iter().enumerate() {
            let link = self.graph.require_link(id)?;
            let mut next = [i64::MAX; 2];
            let mut parent = [0usize; 2];
            for (d, forward) in [(0usize, true), (1, false)] {
                if !forward && link.is_directed() {
                    continue;
                }
                let service = link.serviced_cost(forward, zigzag);
                let start = link.start(forward);
                if i == 0 {
                    next[d] = self.paths.require_distance(depot, start)? + service;
                    continue;
                }
                for e in 0..2 {
                    if best[e] == i64::MAX {
                        continue;
                    }
                    let reach = best[e] + self.paths.require_distance(ends[e], start)? + service;
                    if reach < next[d] {
                        next[d] = reach;
                        parent[d] = e;
                    }
                }
            }
            came_from.push(parent);
            best = next;
            ends = [link.end(true), link.end(false)];
        }

        let mut last = 0;
        let mut total = i64::MAX;
        for e in 0..2 {
            if best[e] == i64::MAX {
                continue;
            }
            let closing = best[e] + self.paths.require_distance(ends[e], depot)?;
            if closing < total {
                total = closing;
                last = e;
            }
        }

        let mut directions = vec![true; m];
        let mut d = last;
        for i in (0..m).rev() {
            directions[i] = d == 0;
            d = came_from[i][d];
        }
        Ok((directions, total))
    }
}

impl IntraRouteImprovementProcedure for Reversal<'_> {
    fn improve_route(&self, route: &Route) -> Result<Route> {
        let compact = route.compact();
        let (directions, cost) = self.orient(compact)?;
        if cost >= route.cost() {
            return Ok(route.clone());
        }
        let Some(candidate) = CompactRoute::from_parts(compact.links().to_vec(), directions, compact.zigzag().to_vec())
        else {
            return Ok(route.clone());
        };
        debug!("reversal: {} -> {}", route.cost(), cost);
        RouteExpander::new(self.graph, self.paths).unflatten(&candidate, route.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;
    use crate::route::RouteKind;

    fn brute_force(g: &Graph, sp: &ShortestPaths, links: &[usize]) -> i64 {
        let ex = RouteExpander::new(g, sp);
        let m = links.len();
        (0..1u32 << m)
            .map(|mask| {
                let fwd = (0..m).map(|i| mask & (1 << i) == 0).collect();
                let c = CompactRoute::from_parts(links.to_vec(), fwd, vec![false; m]).unwrap();
                ex.cost_of(&c).unwrap()
            })
            .min()
            .unwrap()
    }

    fn windy() -> Graph {
        let mut g = Graph::with_vertices(GraphKind::Windy, 5);
        g.add_windy_edge(1, 2, 3, 9, true).unwrap();
        g.add_windy_edge(2, 3, 8, 2, true).unwrap();
        g.add_windy_edge(3, 4, 1, 6, true).unwrap();
        g.add_windy_edge(4, 5, 5, 5, true).unwrap();
        g.add_windy_edge(5, 1, 2, 7, true).unwrap();
        g
    }

    #[test]
    fn test_matches_brute_force() {
        let g = windy();
        let sp = ShortestPaths::compute(&g);
        let order = [3, 1, 5, 2, 4];
        let (dirs, cost) = Reversal::new(&g, &sp).orient(&CompactRoute::forward_only(order.to_vec())).unwrap();
        assert_eq!(cost, brute_force(&g, &sp, &order));
        let c = CompactRoute::from_parts(order.to_vec(), dirs, vec![false; 5]).unwrap();
        assert_eq!(RouteExpander::new(&g, &sp).cost_of(&c).unwrap(), cost);
    }

    #[test]
    fn test_improve_route_never_worsens() {
        let g = windy();
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let route = ex
            .unflatten(&CompactRoute::from_parts(vec![2, 4], vec![true, false], vec![false; 2]).unwrap(), RouteKind::Tour)
            .unwrap();
        let out = Reversal::new(&g, &sp).improve_route(&route).unwrap();
        assert!(out.cost() <= route.cost());
        assert_eq!(out.cost(), brute_force(&g, &sp, &[2, 4]).min(route.cost()));
        out.check(&g).unwrap();
    }

    #[test]
    fn test_directed_links_stay_forward() {
        let mut g = Graph::with_vertices(GraphKind::Directed, 3);
        g.add_arc(1, 2, 1, true).unwrap();
        g.add_arc(2, 3, 1, true).unwrap();
        g.add_arc(3, 1, 1, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let (dirs, cost) = Reversal::new(&g, &sp).orient(&CompactRoute::forward_only(vec![1, 2, 3])).unwrap();
        assert_eq!(dirs, vec![true; 3]);
        assert_eq!(cost, 3);
    }
}
