//! Improvement procedure traits and the descent drivers shared by the
//! concrete neighbourhoods.

use log::trace;
use rand::Rng;

use super::ImprovementStrategy;
use crate::error::{Result, RoutingError};
use crate::moves::{CompactMove, MoveEngine};
use crate::route::{CompactRoute, Route, RouteExpander};

/// A procedure that maps a solution to a solution at least as good under
/// its own acceptance rule.
pub trait ImprovementProcedure {
    /// Returns the improved route collection; `routes` is left untouched.
    fn improve_solution(&self, routes: &[Route]) -> Result<Vec<Route>>;
}

/// A procedure that works on one route at a time.
///
/// Every implementor is also an [`ImprovementProcedure`] applying itself
/// to each route of the solution independently.
pub trait IntraRouteImprovementProcedure {
    /// Returns an improved copy of `route`, or a clone if nothing improves.
    fn improve_route(&self, route: &Route) -> Result<Route>;
}

impl<T: IntraRouteImprovementProcedure> ImprovementProcedure for T {
    fn improve_solution(&self, routes: &[Route]) -> Result<Vec<Route>> {
        routes.iter().map(|r| self.improve_route(r)).collect()
    }
}

/// Index of the most expensive route, the first one on ties.
pub(crate) fn longest_route(routes: &[Route]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, r) in routes.iter().enumerate() {
        match best {
            Some(b) if routes[b].cost() >= r.cost() => {}
            _ => best = Some(i),
        }
    }
    best
}

fn expands(expander: &RouteExpander<'_>, compact: &CompactRoute, route: &Route) -> Result<Option<Route>> {
    match expander.unflatten(compact, route.kind()) {
        Ok(r) => Ok(Some(r)),
        Err(RoutingError::InfeasibleZigZag { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Drives an intra-route neighbourhood over compact candidates.
///
/// Candidates are priced with [`RouteExpander::cost_of`] and only
/// candidates cheaper than the current record are accepted. Candidates
/// whose zigzag elections no longer fit their windows are skipped.
pub(crate) fn intra_descent<F>(
    expander: &RouteExpander<'_>,
    route: &Route,
    strategy: ImprovementStrategy,
    max_passes: usize,
    seed: u64,
    mut neighbours: F,
) -> Result<Route>
where
    F: FnMut(&CompactRoute) -> Vec<CompactRoute>,
{
    match strategy {
        ImprovementStrategy::RandomMove => {
            let candidates = neighbours(route.compact());
            if candidates.is_empty() {
                return Ok(route.clone());
            }
            let mut rng = u_numflow::random::create_rng(seed);
            let pick = rng.random_range(0..candidates.len());
            Ok(expands(expander, &candidates[pick], route)?.unwrap_or_else(|| route.clone()))
        }
        ImprovementStrategy::FirstImprovement => {
            let record_cost = route.cost();
            for candidate in neighbours(route.compact()) {
                if expander.cost_of(&candidate)? < record_cost {
                    if let Some(better) = expands(expander, &candidate, route)? {
                        return Ok(better);
                    }
                }
            }
            Ok(route.clone())
        }
        ImprovementStrategy::SteepestDescent => {
            let mut record = route.clone();
            for pass in 0..max_passes {
                let mut priced = Vec::new();
                for candidate in neighbours(record.compact()) {
                    let cost = expander.cost_of(&candidate)?;
                    if cost < record.cost() {
                        priced.push((cost, candidate));
                    }
                }
                priced.sort_by_key(|(cost, _)| *cost);
                let mut accepted = None;
                for (_, candidate) in &priced {
                    if let Some(better) = expands(expander, candidate, &record)? {
                        accepted = Some(better);
                        break;
                    }
                }
                match accepted {
                    Some(better) => {
                        trace!("descent pass {}: {} -> {}", pass, record.cost(), better.cost());
                        record = better;
                    }
                    None => break,
                }
            }
            Ok(record)
        }
    }
}

fn worst(routes: &[Route]) -> i64 {
    routes.iter().map(Route::cost).max().unwrap_or(0)
}

fn commit(engine: &MoveEngine<'_>, batch: &[CompactMove], routes: &[Route]) -> Result<Option<Vec<Route>>> {
    match engine.apply_to(batch, routes) {
        Ok(next) => Ok(Some(next)),
        Err(RoutingError::InfeasibleZigZag { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Drives an inter-route neighbourhood of move batches.
///
/// `batches` enumerates the candidate batches for the current solution and
/// the index of its longest route. A batch is improving when it lowers the
/// worst route cost.
pub(crate) fn inter_descent<F>(
    engine: &MoveEngine<'_>,
    routes: &[Route],
    strategy: ImprovementStrategy,
    max_passes: usize,
    seed: u64,
    batches: F,
) -> Result<Vec<Route>>
where
    F: Fn(&[Route], usize) -> Vec<Vec<CompactMove>>,
{
    let mut current = routes.to_vec();
    let Some(longest) = longest_route(&current) else {
        return Ok(current);
    };
    match strategy {
        ImprovementStrategy::RandomMove => {
            let candidates = batches(&current, longest);
            if candidates.is_empty() {
                return Ok(current);
            }
            let mut rng = u_numflow::random::create_rng(seed);
            let pick = rng.random_range(0..candidates.len());
            Ok(commit(engine, &candidates[pick], &current)?.unwrap_or(current))
        }
        ImprovementStrategy::FirstImprovement => {
            for mut batch in batches(&current, longest) {
                if engine.evaluate(&mut batch, &current)? < 0 {
                    if let Some(next) = commit(engine, &batch, &current)? {
                        if worst(&next) < worst(&current) {
                            return Ok(next);
                        }
                    }
                }
            }
            Ok(current)
        }
        ImprovementStrategy::SteepestDescent => {
            for _ in 0..max_passes {
                let Some(longest) = longest_route(&current) else {
                    break;
                };
                let mut priced = Vec::new();
                for mut batch in batches(&current, longest) {
                    let delta = engine.evaluate(&mut batch, &current)?;
                    if delta < 0 {
                        priced.push((delta, batch));
                    }
                }
                priced.sort_by_key(|(delta, _)| *delta);
                let mut accepted = None;
                for (_, batch) in &priced {
                    if let Some(next) = commit(engine, batch, &current)? {
                        if worst(&next) < worst(&current) {
                            accepted = Some(next);
                            break;
                        }
                    }
                }
                match accepted {
                    Some(next) => current = next,
                    None => break,
                }
            }
            Ok(current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::ShortestPaths;
    use crate::graph::{Graph, GraphKind};
    use crate::route::RouteKind;

    struct Identity;

    impl IntraRouteImprovementProcedure for Identity {
        fn improve_route(&self, route: &Route) -> Result<Route> {
            Ok(route.clone())
        }
    }

    #[test]
    fn test_blanket_union_over_routes() {
        let routes = vec![Route::tour(1), Route::tour(1)];
        let out = Identity.improve_solution(&routes).unwrap();
        assert_eq!(out, routes);
    }

    #[test]
    fn test_longest_route_first_on_ties() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
        let a = g.add_edge(1, 2, 3, true).unwrap();
        let b = g.add_edge(1, 3, 3, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let routes: Vec<Route> = [vec![], vec![a], vec![b]]
            .into_iter()
            .map(|l| ex.unflatten(&CompactRoute::forward_only(l), RouteKind::Tour).unwrap())
            .collect();
        assert_eq!(longest_route(&routes), Some(1));
        assert_eq!(longest_route(&[]), None);
    }

    #[test]
    fn test_first_improvement_keeps_route_without_gain() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 2);
        let a = g.add_edge(1, 2, 3, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let route = ex.unflatten(&CompactRoute::forward_only(vec![a]), RouteKind::Tour).unwrap();
        let out = intra_descent(&ex, &route, ImprovementStrategy::FirstImprovement, 10, 1, |c| vec![c.clone()]).unwrap();
        assert_eq!(out, route);
    }
}
