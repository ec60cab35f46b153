//! Intra-route or-interchange on the compact form.
//!
//! # Algorithm
//!
//! A segment of up to `L` consecutive serviced links is lifted out of the
//! compact sequence and reinserted so that it starts up to `M` positions
//! earlier or later. Directions travel with the links; deadheads are
//! re-derived from shortest paths when a candidate is priced.
//!
//! # Reference
//!
//! Benavent, E. et al. (2005). "New heuristic algorithms for the windy
//! rural postman problem", *Computers & Operations Research* 32(12).

use super::procedure::intra_descent;
use super::{ImprovementConfig, ImprovementStrategy, IntraRouteImprovementProcedure};
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::Graph;
use crate::route::{CompactRoute, Route, RouteExpander};

/// Segment relocation within one route.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::improvement::{
///     ImprovementConfig, ImprovementStrategy, IntraRouteImprovementProcedure, OrInterchange,
/// };
/// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
///
/// // A line 1-2-3; servicing the far link first forces a detour.
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
/// let near = g.add_edge(1, 2, 1, true).unwrap();
/// let far = g.add_edge(2, 3, 1, true).unwrap();
/// let sp = ShortestPaths::compute(&g);
/// let ex = RouteExpander::new(&g, &sp);
/// let route = ex
///     .unflatten(&CompactRoute::from_parts(vec![far, near], vec![true, true], vec![false; 2]).unwrap(), RouteKind::Tour)
///     .unwrap();
///
/// let config = ImprovementConfig::default().with_strategy(ImprovementStrategy::SteepestDescent);
/// let better = OrInterchange::new(&g, &sp, &config).improve_route(&route).unwrap();
/// assert!(better.cost() < route.cost());
/// ```
#[derive(Debug, Clone)]
pub struct OrInterchange<'a> {
    expander: RouteExpander<'a>,
    strategy: ImprovementStrategy,
    segment: usize,
    shift: usize,
    max_passes: usize,
    seed: u64,
}

impl<'a> OrInterchange<'a> {
    /// Creates the procedure with the strategy and limits in `config`.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths, config: &ImprovementConfig) -> Self {
        Self {
            expander: RouteExpander::new(graph, paths),
            strategy: config.strategy,
            segment: config.or_segment,
            shift: config.or_shift,
            max_passes: config.max_passes,
            seed: config.seed,
        }
    }

    /// Overrides the strategy.
    pub fn with_strategy(mut self, strategy: ImprovementStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Every sequence reachable by one segment relocation.
pub(crate) fn segment_moves(compact: &CompactRoute, segment: usize, shift: usize) -> Vec<CompactRoute> {
    let n = compact.len();
    let mut out = Vec::new();
    for start in 0..n {
        for len in 1..=segment {
            if start + len > n {
                break;
            }
            for offset in 1..=shift {
                // Backward: the segment ends up starting `offset` earlier.
                if offset <= start {
                    out.push(relocated(compact, start, len, start - offset));
                }
                // Forward: `offset` trailing links move in front of it.
                if start + len + offset <= n {
                    out.push(relocated(compact, start, len, start + offset));
                }
            }
        }
    }
    out
}

fn relocated(compact: &CompactRoute, start: usize, len: usize, target: usize) -> CompactRoute {
    let mut work = compact.clone();
    let lifted: Vec<_> = (0..len).map(|_| work.remove(start)).collect();
    for (k, (link, forward, zigzag)) in lifted.into_iter().enumerate() {
        work.insert(target + k, link, forward, zigzag);
    }
    work
}

impl IntraRouteImprovementProcedure for OrInterchange<'_> {
    fn improve_route(&self, route: &Route) -> Result<Route> {
        let (segment, shift) = (self.segment, self.shift);
        intra_descent(&self.expander, route, self.strategy, self.max_passes, self.seed, |c| {
            segment_moves(c, segment, shift)
        })
    }
}
