//! Inter-route exchange of one link between the longest route and another.

use super::procedure::inter_descent;
use super::{ImprovementConfig, ImprovementProcedure, ImprovementStrategy};
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::Graph;
use crate::moves::{CompactMove, MoveEngine};
use crate::route::Route;

/// Swaps one link of the longest route with one link of another route.
///
/// Each swap is a chained pair: the longest route's link is inserted in
/// front of its partner, which then shifts one position and is moved back
/// into the gap.
#[derive(Debug, Clone, Copy)]
pub struct Change1to1<'a> {
    engine: MoveEngine<'a>,
    strategy: ImprovementStrategy,
    max_passes: usize,
    seed: u64,
}

impl<'a> Change1to1<'a> {
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

fn swaps(routes: &[Route], longest: usize) -> Vec<Vec<CompactMove>> {
    let lim = routes[longest].compact().len();
    let mut out = Vec::new();
    for (r, route) in routes.iter().enumerate() {
        if r == longest {
            continue;
        }
        for i in 0..lim {
            for j in 0..route.compact().len() {
                out.push(vec![
                    CompactMove::unchecked(longest, i, r, j),
                    CompactMove::unchecked(r, j + 1, longest, i),
                ]);
            }
        }
    }
    out
}

impl ImprovementProcedure for Change1to1<'_> {
    fn improve_solution(&self, routes: &[Route]) -> Result<Vec<Route>> {
        inter_descent(&self.engine, routes, self.strategy, self.max_passes, self.seed, swaps)
    }
}
