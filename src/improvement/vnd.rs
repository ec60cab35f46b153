//! Variable neighbourhood descent over the intra- and inter-route
//! procedures.

use log::debug;

use super::{
    Change1to0, Change1to1, Change2to0, ChangeZigZagDecision, ImprovementConfig, ImprovementProcedure,
    ImprovementStrategy, IntraRouteImprovementProcedure, OrInterchange, Reversal, TwoInterchange,
};
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::Graph;
use crate::route::Route;

/// Or-interchange, reversal, two-interchange and zigzag decisions,
/// restarting from the first neighbourhood after every improvement.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::improvement::{ImprovementConfig, IntraRouteImprovementProcedure, IntraRouteVnd};
/// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Windy, 3);
/// let a = g.add_windy_edge(1, 2, 1, 9, true).unwrap();
/// let b = g.add_windy_edge(2, 3, 1, 9, true).unwrap();
/// let c = g.add_windy_edge(3, 1, 1, 9, true).unwrap();
/// let sp = ShortestPaths::compute(&g);
/// let ex = RouteExpander::new(&g, &sp);
/// let route = ex
///     .unflatten(&CompactRoute::from_parts(vec![c, b, a], vec![false; 3], vec![false; 3]).unwrap(), RouteKind::Tour)
///     .unwrap();
///
/// let vnd = IntraRouteVnd::new(&g, &sp, &ImprovementConfig::default());
/// assert_eq!(vnd.improve_route(&route).unwrap().cost(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct IntraRouteVnd<'a> {
    or_interchange: OrInterchange<'a>,
    reversal: Reversal<'a>,
    two_interchange: TwoInterchange<'a>,
    zigzag: ChangeZigZagDecision<'a>,
    max_passes: usize,
}

impl<'a> IntraRouteVnd<'a> {
    /// Creates the descent; the neighbourhoods run steepest descent.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths, config: &ImprovementConfig) -> Self {
        Self {
            or_interchange: OrInterchange::new(graph, paths, config)
                .with_strategy(ImprovementStrategy::SteepestDescent),
            reversal: Reversal::new(graph, paths),
            two_interchange: TwoInterchange::new(graph, paths, config)
                .with_strategy(ImprovementStrategy::SteepestDescent),
            zigzag: ChangeZigZagDecision::new(graph),
            max_passes: config.max_passes,
        }
    }
}

impl IntraRouteImprovementProcedure for IntraRouteVnd<'_> {
    fn improve_route(&self, route: &Route) -> Result<Route> {
        let mut best = route.clone();
        for _ in 0..self.max_passes {
            let candidate = self.or_interchange.improve_route(&best)?;
            if candidate.cost() < best.cost() {
                best = candidate;
                continue;
            }
            let candidate = self.reversal.improve_route(&best)?;
            if candidate.cost() < best.cost() {
                best = candidate;
                continue;
            }
            let candidate = self.two_interchange.improve_route(&best)?;
            if candidate.cost() < best.cost() {
                best = candidate;
                continue;
            }
            let candidate = self.zigzag.improve_route(&best)?;
            if candidate.cost() < best.cost() {
                best = candidate;
                continue;
            }
            break;
        }
        Ok(best)
    }
}

/// Change1to0, Change2to0 and Change1to1 in sequence, repeated while the
/// worst route keeps getting cheaper.
#[derive(Debug, Clone, Copy)]
pub struct InterRouteVnd<'a> {
    one_to_zero: Change1to0<'a>,
    two_to_zero: Change2to0<'a>,
    one_to_one: Change1to1<'a>,
    max_passes: usize,
}

impl<'a> InterRouteVnd<'a> {
    /// Creates the descent; the neighbourhoods take first improvements.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths, config: &ImprovementConfig) -> Self {
        let first = ImprovementStrategy::FirstImprovement;
        Self {
            one_to_zero: Change1to0::new(graph, paths, config).with_strategy(first),
            two_to_zero: Change2to0::new(graph, paths, config).with_strategy(first),
            one_to_one: Change1to1::new(graph, paths, config).with_strategy(first),
            max_passes: config.max_passes,
        }
    }
}

fn worst(routes: &[Route]) -> i64 {
    routes.iter().map(Route::cost).max().unwrap_or(0)
}

impl ImprovementProcedure for InterRouteVnd<'_> {
    fn improve_solution(&self, routes: &[Route]) -> Result<Vec<Route>> {
        let mut current = routes.to_vec();
        for pass in 0..self.max_passes {
            let before = worst(&current);
            let next = self.one_to_zero.improve_solution(&current)?;
            let next = self.two_to_zero.improve_solution(&next)?;
            let next = self.one_to_one.improve_solution(&next)?;
            let after = worst(&next);
            if after >= before {
                break;
            }
            debug!("inter-route pass {}: worst route {} -> {}", pass, before, after);
            current = next;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;
    use crate::route::{CompactRoute, RouteExpander, RouteKind};

    fn star(costs: &[i64]) -> Graph {
        let mut g = Graph::with_vertices(GraphKind::Undirected, costs.len() + 1);
        for (i, &c) in costs.iter().enumerate() {
            g.add_edge(1, i + 2, c, true).unwrap();
        }
        g
    }

    #[test]
    fn test_inter_vnd_balances_star() {
        let g = star(&[1, 1, 1, 1, 1, 1]);
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let routes = vec![
            ex.unflatten(&CompactRoute::forward_only((1..=6).collect()), RouteKind::Tour).unwrap(),
            ex.unflatten(&CompactRoute::new(), RouteKind::Tour).unwrap(),
        ];
        let out = InterRouteVnd::new(&g, &sp, &ImprovementConfig::default())
            .improve_solution(&routes)
            .unwrap();
        assert_eq!(worst(&out), 6);
        let mut serviced: Vec<usize> = out.iter().flat_map(|r| r.compact().links().to_vec()).collect();
        serviced.sort_unstable();
        assert_eq!(serviced, (1..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_intra_vnd_never_worsens() {
        let g = star(&[3, 1, 2]);
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let route = ex
            .unflatten(&CompactRoute::forward_only(vec![3, 1, 2]), RouteKind::Tour)
            .unwrap();
        let out = IntraRouteVnd::new(&g, &sp, &ImprovementConfig::default())
            .improve_route(&route)
            .unwrap();
        assert!(out.cost() <= route.cost());
        out.check(&g).unwrap();
    }
}
