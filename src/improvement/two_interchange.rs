//! Two-interchange: inversion of a block of serviced links.
//!
//! Reversing positions `i..=j` of the compact sequence also flips every
//! direction inside the block, so on symmetric graphs the interior
//! deadheads keep their cost and only the two boundary connections change.

use super::procedure::intra_descent;
use super::{ImprovementConfig, ImprovementStrategy, IntraRouteImprovementProcedure};
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::Graph;
use crate::route::{CompactRoute, Route, RouteExpander};

/// 2-opt style block inversion on the compact form.
#[derive(Debug, Clone)]
pub struct TwoInterchange<'a> {
    expander: RouteExpander<'a>,
    strategy: ImprovementStrategy,
    max_passes: usize,
    seed: u64,
}

impl<'a> TwoInterchange<'a> {
    /// Creates the procedure with the strategy in `config`.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths, config: &ImprovementConfig) -> Self {
        Self {
            expander: RouteExpander::new(graph, paths),
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

fn inversions(compact: &CompactRoute) -> Vec<CompactRoute> {
    let n = compact.len();
    let mut out = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            let mut candidate = compact.clone();
            candidate.reverse_segment(i, j);
            out.push(candidate);
        }
    }
    out
}

impl IntraRouteImprovementProcedure for TwoInterchange<'_> {
    fn improve_route(&self, route: &Route) -> Result<Route> {
        intra_descent(&self.expander, route, self.strategy, self.max_passes, self.seed, inversions)
    }
}
