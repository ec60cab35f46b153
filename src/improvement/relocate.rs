//! Inter-route relocation out of the longest route.
//!
//! - [`Change1to0`] moves one serviced link to another route.
//! - [`Change2to0`] moves two consecutive serviced links, as a chained
//!   batch of two single-link moves.
//!
//! Both only accept batches that lower the worst route cost.

use super::procedure::inter_descent;
use super::{ImprovementConfig, ImprovementProcedure, ImprovementStrategy};
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::Graph;
use crate::moves::{CompactMove, MoveEngine};
use crate::route::Route;

/// Relocates one link from the longest route.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::improvement::{Change1to0, ImprovementConfig, ImprovementProcedure};
/// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
/// let a = g.add_edge(1, 2, 4, true).unwrap();
/// let b = g.add_edge(1, 3, 4, true).unwrap();
/// let sp = ShortestPaths::compute(&g);
/// let ex = RouteExpander::new(&g, &sp);
/// let routes = vec![
///     ex.unflatten(&CompactRoute::forward_only(vec![a, b]), RouteKind::Tour).unwrap(),
///     ex.unflatten(&CompactRoute::new(), RouteKind::Tour).unwrap(),
/// ];
///
/// let out = Change1to0::new(&g, &sp, &ImprovementConfig::default())
///     .improve_solution(&routes)
///     .unwrap();
/// assert_eq!(out[0].cost().max(out[1].cost()), 8);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Change1to0<'a> {
    engine: MoveEngine<'a>,
    strategy: ImprovementStrategy,
    max_passes: usize,
    seed: u64,
}

impl<'a> Change1to0<'a> {
    /// Creates the procedure with the strategy in `config`.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths, config: &ImprovementConfig) -> Self {
        Self {
            engine: MoveEngine::new(graph, paths),
            strategy: config.strategy,
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

fn single_moves(routes: &[Route], longest: usize) -> Vec<Vec<CompactMove>> {
    let lim = routes[longest].compact().len();
    let mut out = Vec::new();
    for (r, route) in routes.iter().enumerate() {
        if r == longest {
            continue;
        }
        for i in 0..lim {
            for j in 0..=route.compact().len() {
                out.push(vec![CompactMove::unchecked(longest, i, r, j)]);
            }
        }
    }
    out
}

impl ImprovementProcedure for Change1to0<'_> {
    fn improve_solution(&self, routes: &[Route]) -> Result<Vec<Route>> {
        inter_descent(&self.engine, routes, self.strategy, self.max_passes, self.seed, single_moves)
    }
}

/// Relocates two consecutive links from the longest route.
#[derive(Debug, Clone, Copy)]
pub struct Change2to0<'a> {
    engine: MoveEngine<'a>,
    strategy: ImprovementStrategy,
    max_passes: usize,
    seed: u64,
}

impl<'a> Change2to0<'a> {
    /// Creates the procedure with the strategy in `config`.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths, config: &ImprovementConfig) -> Self {
        Self {
            engine: MoveEngine::new(graph, paths),
            strategy: config.strategy,
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

fn pair_moves(routes: &[Route], longest: usize) -> Vec<Vec<CompactMove>> {
    let lim = routes[longest].compact().len();
    let mut out = Vec::new();
    for (r, route) in routes.iter().enumerate() {
        if r == longest {
            continue;
        }
        for i in 0..lim.saturating_sub(1) {
            for j in 0..=route.compact().len() {
                // After the first move the follower sits at `i`.
                out.push(vec![
                    CompactMove::unchecked(longest, i, r, j),
                    CompactMove::unchecked(longest, i, r, j + 1),
                ]);
            }
        }
    }
    out
}

impl ImprovementProcedure for Change2to0<'_> {
    fn improve_solution(&self, routes: &[Route]) -> Result<Vec<Route>> {
        inter_descent(&self.engine, routes, self.strategy, self.max_passes, self.seed, pair_moves)
    }
}
