//! Constant-time pricing and application of relocation batches.

use std::collections::BTreeMap;

use log::debug;

use super::CompactMove;
use crate::distance::ShortestPaths;
use crate::error::{Result, RoutingError};
use crate::graph::{Graph, LinkId, VertexId};
use crate::route::{CompactRoute, Route, RouteExpander};

/// Prices and commits batches of [`CompactMove`]s.
///
/// Deltas are taken from the shortest-path snapshot, so a route changes
/// value as the tour [`RouteExpander`] would build from its compact form.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::moves::{CompactMove, MoveEngine};
/// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
/// let a = g.add_edge(1, 2, 5, true).unwrap();
/// let b = g.add_edge(1, 3, 1, true).unwrap();
/// let sp = ShortestPaths::compute(&g);
/// let ex = RouteExpander::new(&g, &sp);
/// let routes = vec![
///     ex.unflatten(&CompactRoute::forward_only(vec![a, b]), RouteKind::Tour).unwrap(),
///     ex.unflatten(&CompactRoute::new(), RouteKind::Tour).unwrap(),
/// ];
///
/// let engine = MoveEngine::new(&g, &sp);
/// let mut batch = [CompactMove::new(&routes, 0, 0, 1, 0)];
/// // Worst route drops from 5+5+1+1 = 12 to 10.
/// assert_eq!(engine.evaluate(&mut batch, &routes).unwrap(), -2);
/// let changed = engine.apply(&batch, &routes).unwrap();
/// assert_eq!(changed[&1].cost(), 10);
/// assert_eq!(changed[&0].cost(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MoveEngine<'a> {
    graph: &'a Graph,
    paths: &'a ShortestPaths,
}

/// First edit on a route, recorded against its original compact form.
#[derive(Debug, Clone, Copy)]
enum Edit {
    Remove(usize),
    Insert {
        index: usize,
        link: LinkId,
        forward: bool,
        zigzag: bool,
    },
}

impl Edit {
    fn apply(self, compact: &mut CompactRoute) {
        match self {
            Self::Remove(pos) => {
                compact.remove(pos);
            }
            Self::Insert {
                index,
                link,
                forward,
                zigzag,
            } => compact.insert(index, link, forward, zigzag),
        }
    }
}

/// Result of replaying a batch.
///
/// A route touched once keeps only its [`Edit`]; a working copy is made
/// when a second step reaches the same route.
struct Replay {
    base: Vec<i64>,
    ledger: Vec<i64>,
    pending: Vec<Option<Edit>>,
    working: BTreeMap<usize, CompactRoute>,
}

impl Replay {
    fn is_fresh(&self, route: usize) -> bool {
        self.pending[route].is_none() && !self.working.contains_key(&route)
    }

    fn materialise(&mut self, routes: &[Route], route: usize) -> &mut CompactRoute {
        let pending = &mut self.pending;
        self.working.entry(route).or_insert_with(|| {
            let mut compact = routes[route].compact().clone();
            if let Some(edit) = pending[route].take() {
                edit.apply(&mut compact);
            }
            compact
        })
    }

    /// Compact form of every touched route after the whole batch.
    fn into_touched(mut self, routes: &[Route]) -> BTreeMap<usize, CompactRoute> {
        for route in 0..self.pending.len() {
            if self.pending[route].is_some() {
                self.materialise(routes, route);
            }
        }
        self.working
    }
}

impl<'a> MoveEngine<'a> {
    /// Creates an engine over a graph and its shortest-path snapshot.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths) -> Self {
        Self { graph, paths }
    }

    fn dist(&self, from: VertexId, to: VertexId) -> Result<i64> {
        self.paths.require_distance(from, to)
    }

    fn before(&self, compact: &CompactRoute, index: usize) -> Result<VertexId> {
        if index == 0 {
            return Ok(self.graph.depot());
        }
        let (link, forward, _) = compact
            .get(index - 1)
            .ok_or(RoutingError::InvalidMovePosition {
                route: usize::MAX,
                position: index,
                len: compact.len(),
            })?;
        Ok(self.graph.require_link(link)?.end(forward))
    }

    fn after(&self, compact: &CompactRoute, index: usize) -> Result<VertexId> {
        match compact.get(index) {
            None => Ok(self.graph.depot()),
            Some((link, forward, _)) => Ok(self.graph.require_link(link)?.start(forward)),
        }
    }

    /// Cost removed from `compact` by lifting out the entry at `pos`.
    fn removal_savings(&self, compact: &CompactRoute, pos: usize) -> Result<i64> {
        let (id, forward, zigzag) = compact
            .get(pos)
            .ok_or(RoutingError::InvalidMovePosition {
                route: usize::MAX,
                position: pos,
                len: compact.len(),
            })?;
        let link = self.graph.require_link(id)?;
        let prev = self.before(compact, pos)?;
        let next = self.after(compact, pos + 1)?;
        Ok(self.dist(prev, link.start(forward))?
            + link.serviced_cost(forward, zigzag)
            + self.dist(link.end(forward), next)?
            - self.dist(prev, next)?)
    }

    /// Cheapest insertion of `id` before `index`, forward on ties.
    ///
    /// `fixed` forces the orientation when the link allows it.
    fn insertion(
        &self,
        compact: &CompactRoute,
        index: usize,
        id: LinkId,
        zigzag: bool,
        fixed: Option<bool>,
    ) -> Result<(i64, bool)> {
        let link = self.graph.require_link(id)?;
        let prev = self.before(compact, index)?;
        let next = self.after(compact, index)?;
        let gap = self.dist(prev, next)?;
        let price = |forward: bool| -> Result<i64> {
            Ok(self.dist(prev, link.start(forward))?
                + link.serviced_cost(forward, zigzag)
                + self.dist(link.end(forward), next)?
                - gap)
        };
        if link.is_directed() {
            return Ok((price(true)?, true));
        }
        if let Some(forward) = fixed {
            return Ok((price(forward)?, forward));
        }
        let forward_cost = price(true)?;
        let reverse_cost = price(false)?;
        if reverse_cost < forward_cost {
            Ok((reverse_cost, false))
        } else {
            Ok((forward_cost, true))
        }
    }

    fn replay(&self, moves: &mut [CompactMove], routes: &[Route], use_recorded: bool) -> Result<Replay> {
        let mut base = Vec::with_capacity(routes.len());
        for (i, route) in routes.iter().enumerate() {
            if !route.kind().is_tour() {
                return Err(RoutingError::UnsupportedRoute(format!(
                    "route {i} is an open path; moves need closed tours"
                )));
            }
            base.push(route.cost());
        }
        let mut replay = Replay {
            ledger: base.clone(),
            base,
            pending: vec![None; routes.len()],
            working: BTreeMap::new(),
        };

        for m in moves.iter_mut() {
            for r in [m.from(), m.to()] {
                if r >= routes.len() {
                    return Err(RoutingError::UnknownRoute(r));
                }
            }
            let (from, pos) = (m.from(), m.from_pos());
            let removal = |src: &CompactRoute| -> Result<(i64, LinkId, bool)> {
                let Some((link, _, zigzag)) = src.get(pos) else {
                    return Err(RoutingError::InvalidMovePosition {
                        route: from,
                        position: pos,
                        len: src.len(),
                    });
                };
                Ok((self.removal_savings(src, pos)?, link, zigzag))
            };
            let (savings, link, zigzag) = if replay.is_fresh(from) {
                let priced = removal(routes[from].compact())?;
                replay.pending[from] = Some(Edit::Remove(pos));
                priced
            } else {
                let src = replay.materialise(routes, from);
                let priced = removal(&*src)?;
                src.remove(pos);
                priced
            };
            replay.ledger[from] -= savings;

            let (to, index) = (m.to(), m.insertion_index());
            let fixed = if use_recorded { m.direction() } else { None };
            let insertion = |dest: &CompactRoute| -> Result<(i64, bool)> {
                if index > dest.len() {
                    return Err(RoutingError::InvalidMovePosition {
                        route: to,
                        position: m.to_pos(),
                        len: dest.len(),
                    });
                }
                self.insertion(dest, index, link, zigzag, fixed)
            };
            let (cost, forward) = if replay.is_fresh(to) {
                let priced = insertion(routes[to].compact())?;
                replay.pending[to] = Some(Edit::Insert {
                    index,
                    link,
                    forward: priced.1,
                    zigzag,
                });
                priced
            } else {
                let dest = replay.materialise(routes, to);
                let priced = insertion(&*dest)?;
                dest.insert(index, link, priced.1, zigzag);
                priced
            };
            replay.ledger[to] += cost;
            m.set_direction(forward);
        }
        Ok(replay)
    }

    /// Change in the worst route cost if `moves` were applied in order.
    ///
    /// Records the chosen orientation in every move. Each route starts from
    /// its own [`Route::cost`] and moves adjust it by shortest-path deltas,
    /// which is exact for routes built by [`RouteExpander`]. Every step
    /// costs O(1) unless an earlier step already touched its route, in
    /// which case a working copy of that route is made once.
    ///
    /// # Errors
    ///
    /// [`RoutingError::UnsupportedRoute`] if a route is a path,
    /// [`RoutingError::UnknownRoute`] or
    /// [`RoutingError::InvalidMovePosition`] for bad moves, and
    /// [`RoutingError::Disconnected`] if a needed distance is missing.
    pub fn evaluate(&self, moves: &mut [CompactMove], routes: &[Route]) -> Result<i64> {
        let replay = self.replay(moves, routes, false)?;
        let old = replay.base.iter().copied().max().unwrap_or(0);
        let new = replay.ledger.iter().copied().max().unwrap_or(0);
        Ok(new - old)
    }

    /// Change in the summed route cost if `moves` were applied in order.
    pub fn evaluate_total(&self, moves: &mut [CompactMove], routes: &[Route]) -> Result<i64> {
        let replay = self.replay(moves, routes, false)?;
        Ok(replay.ledger.iter().sum::<i64>() - replay.base.iter().sum::<i64>())
    }

    /// Applies `moves` in order and re-expands every touched route.
    ///
    /// Orientations recorded by [`evaluate`](Self::evaluate) are reused;
    /// moves without one get the cheaper orientation. Nothing is returned
    /// unless every step succeeds. Moved links keep their zigzag election
    /// and every election is re-checked against its window.
    pub fn apply(&self, moves: &[CompactMove], routes: &[Route]) -> Result<BTreeMap<usize, Route>> {
        let mut batch = moves.to_vec();
        let touched = self.replay(&mut batch, routes, true)?.into_touched(routes);
        let expander = RouteExpander::new(self.graph, self.paths);
        let mut out = BTreeMap::new();
        for (index, compact) in touched {
            out.insert(index, expander.unflatten(&compact, routes[index].kind())?);
        }
        debug!("applied {} moves touching {} routes", moves.len(), out.len());
        Ok(out)
    }

    /// Like [`apply`](Self::apply) but returns the full route list.
    pub fn apply_to(&self, moves: &[CompactMove], routes: &[Route]) -> Result<Vec<Route>> {
        let changed = self.apply(moves, routes)?;
        let mut out = routes.to_vec();
        for (index, route) in changed {
            out[index] = route;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphKind, TimeWindow, ZigZagAttributes, ZigZagStatus};
    use crate::route::RouteKind;

    /// A 2×3 windy grid with every link required.
    fn grid() -> Graph {
        let mut g = Graph::with_vertices(GraphKind::Windy, 6);
        g.add_windy_edge(1, 2, 2, 3, true).unwrap();
        g.add_windy_edge(2, 3, 4, 1, true).unwrap();
        g.add_windy_edge(4, 5, 3, 3, true).unwrap();
        g.add_windy_edge(5, 6, 1, 5, true).unwrap();
        g.add_windy_edge(1, 4, 2, 2, true).unwrap();
        g.add_windy_edge(2, 5, 6, 2, true).unwrap();
        g.add_windy_edge(3, 6, 1, 1, true).unwrap();
        g
    }

    fn routes(g: &Graph, sp: &ShortestPaths, parts: &[(&[usize], &[bool])]) -> Vec<Route> {
        let ex = RouteExpander::new(g, sp);
        parts
            .iter()
            .map(|(links, fwd)| {
                let c = CompactRoute::from_parts(links.to_vec(), fwd.to_vec(), vec![false; links.len()]).unwrap();
                ex.unflatten(&c, RouteKind::Tour).unwrap()
            })
            .collect()
    }

    fn max_cost(routes: &[Route]) -> i64 {
        routes.iter().map(Route::cost).max().unwrap()
    }

    #[test]
    fn test_relocation_scenario_exact() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[(&[1, 2, 7], &[true, true, true]), (&[5, 3], &[true, true])]);
        let before_a = rs[0].cost();
        let before_b = rs[1].cost();
        let union_before: Vec<usize> = {
            let mut v: Vec<usize> = rs.iter().flat_map(|r| r.compact().links().to_vec()).collect();
            v.sort_unstable();
            v
        };

        let engine = MoveEngine::new(&g, &sp);
        let mut batch = [CompactMove::new(&rs, 0, 1, 1, 0)];
        let total = engine.evaluate_total(&mut batch, &rs).unwrap();
        let changed = engine.apply(&batch, &rs).unwrap();
        let after_a = changed[&0].cost();
        let after_b = changed[&1].cost();
        assert_eq!(total, (after_a + after_b) - (before_a + before_b));

        // Removal savings from A and insertion cost into B, by hand.
        let d = |i, j| sp.distance(i, j).unwrap();
        let savings = d(2, 2) + 4 + d(3, 3) - d(2, 3);
        assert_eq!(before_a - after_a, savings);
        let dir = batch[0].direction().unwrap();
        let link = g.link(2).unwrap();
        let insertion = d(1, link.start(dir)) + link.traversal_cost(dir) + d(link.end(dir), 1) - d(1, 1);
        assert_eq!(after_b - before_b, insertion);

        let mut union_after: Vec<usize> = changed.values().flat_map(|r| r.compact().links().to_vec()).collect();
        union_after.sort_unstable();
        assert_eq!(union_before, union_after);
    }

    #[test]
    fn test_evaluate_does_not_mutate_routes() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[(&[1, 2], &[true, true]), (&[4], &[false])]);
        let snapshot = rs.clone();
        let engine = MoveEngine::new(&g, &sp);
        let mut batch = [CompactMove::unchecked(0, 0, 1, 1)];
        engine.evaluate(&mut batch, &rs).unwrap();
        assert_eq!(rs, snapshot);
        assert!(batch[0].direction().is_some());
    }

    #[test]
    fn test_ledger_starts_from_route_costs() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[(&[1, 2, 7], &[true, true, true]), (&[5, 3], &[true, true])]);
        let engine = MoveEngine::new(&g, &sp);
        let mut batch = [CompactMove::unchecked(0, 1, 1, 2)];
        let replay = engine.replay(&mut batch, &rs, false).unwrap();
        let costs: Vec<i64> = rs.iter().map(Route::cost).collect();
        assert_eq!(replay.base, costs);
        // One step per route needs no working copy.
        assert!(replay.working.is_empty());
        assert!(replay.pending.iter().all(Option::is_some));
        let touched = replay.into_touched(&rs);
        assert_eq!(touched[&0].links(), &[1, 7]);
        assert_eq!(touched[&1].links(), &[5, 3, 2]);
    }

    #[test]
    fn test_moved_link_keeps_zigzag() {
        let mut g = Graph::with_vertices(GraphKind::ZigZag, 3);
        let attrs = ZigZagAttributes {
            reverse_cost: 1,
            zigzag_cost: 2,
            service_cost: 1,
            reverse_service_cost: 1,
            window: TimeWindow::unbounded(),
            status: ZigZagStatus::Optional,
        };
        g.add_zigzag_link(1, 2, 1, attrs, true).unwrap();
        g.add_zigzag_link(1, 3, 1, attrs, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let busy = CompactRoute::from_parts(vec![1, 2], vec![true, true], vec![true, false]).unwrap();
        let rs = vec![
            ex.unflatten(&busy, RouteKind::ZigZagTour).unwrap(),
            ex.unflatten(&CompactRoute::new(), RouteKind::ZigZagTour).unwrap(),
        ];
        assert_eq!(rs[0].cost(), 3 + 1 + 2 + 1);

        let engine = MoveEngine::new(&g, &sp);
        let mut batch = [CompactMove::unchecked(0, 0, 1, 0)];
        assert_eq!(engine.evaluate(&mut batch, &rs).unwrap(), 4 - 7);
        let changed = engine.apply(&batch, &rs).unwrap();
        assert_eq!(changed[&1].compact().zigzag(), &[true]);
        assert_eq!(changed[&1].cost(), 4);
        assert_eq!(changed[&0].cost(), 3);
    }

    #[test]
    fn test_same_route_move_uses_pre_removal_positions() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[(&[1, 2, 7, 4], &[true, true, true, false])]);
        let engine = MoveEngine::new(&g, &sp);
        // Move the first link to just before the last one.
        let batch = [CompactMove::unchecked(0, 0, 0, 3)];
        let changed = engine.apply(&batch, &rs).unwrap();
        assert_eq!(changed[&0].compact().links(), &[2, 7, 1, 4]);
    }

    #[test]
    fn test_chained_batch_revalidated() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[(&[1], &[true]), (&[3], &[true])]);
        let engine = MoveEngine::new(&g, &sp);
        // Valid only because the first move makes route 1 longer.
        let chained = [CompactMove::unchecked(0, 0, 1, 1), CompactMove::unchecked(1, 1, 0, 0)];
        let changed = engine.apply(&chained, &rs).unwrap();
        assert_eq!(changed[&0].compact().links(), &[1]);
        assert_eq!(changed[&1].compact().links(), &[3]);

        let broken = [CompactMove::unchecked(0, 0, 1, 1), CompactMove::unchecked(1, 5, 0, 0)];
        assert_eq!(
            engine.apply(&broken, &rs).unwrap_err(),
            RoutingError::InvalidMovePosition {
                route: 1,
                position: 5,
                len: 2
            }
        );
    }

    #[test]
    fn test_unknown_route_and_paths_rejected() {
        let g = grid();
        let sp = ShortestPaths::compute(&g);
        let rs = routes(&g, &sp, &[(&[1], &[true])]);
        let engine = MoveEngine::new(&g, &sp);
        let mut bad = [CompactMove::unchecked(0, 0, 4, 0)];
        assert_eq!(
            engine.evaluate(&mut bad, &rs).unwrap_err(),
            RoutingError::UnknownRoute(4)
        );
        let mut path = Route::path();
        path.append_link(&g, 1, true, false).unwrap();
        let mut m = [CompactMove::unchecked(0, 0, 0, 0)];
        assert!(matches!(
            engine.evaluate(&mut m, &[path]),
            Err(RoutingError::UnsupportedRoute(_))
        ));
    }

    #[test]
    fn test_directed_links_keep_orientation() {
        let mut g = Graph::with_vertices(GraphKind::Directed, 3);
        g.add_arc(1, 2, 1, true).unwrap();
        g.add_arc(2, 3, 1, true).unwrap();
        g.add_arc(3, 1, 1, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let ex = RouteExpander::new(&g, &sp);
        let rs = vec![
            ex.unflatten(&CompactRoute::forward_only(vec![1, 2, 3]), RouteKind::Tour).unwrap(),
            ex.unflatten(&CompactRoute::new(), RouteKind::Tour).unwrap(),
        ];
        let engine = MoveEngine::new(&g, &sp);
        let mut batch = [CompactMove::unchecked(0, 1, 1, 0)];
        engine.evaluate(&mut batch, &rs).unwrap();
        assert_eq!(batch[0].direction(), Some(true));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_single_move_agrees_with_apply(
                split in 1usize..6,
                from_pos in 0usize..7,
                to_pos in 0usize..8,
                same in any::<bool>(),
            ) {
                let g = grid();
                let sp = ShortestPaths::compute(&g);
                let links: Vec<usize> = (1..=7).collect();
                let (a, b) = links.split_at(split);
                let ex = RouteExpander::new(&g, &sp);
                let rs = vec![
                    ex.unflatten(&CompactRoute::forward_only(a.to_vec()), RouteKind::Tour).unwrap(),
                    ex.unflatten(&CompactRoute::forward_only(b.to_vec()), RouteKind::Tour).unwrap(),
                ];
                let from_pos = from_pos % a.len();
                let to = if same { 0 } else { 1 };
                let to_pos = to_pos % (rs[to].compact().len() + 1);

                let engine = MoveEngine::new(&g, &sp);
                let mut batch = [CompactMove::unchecked(0, from_pos, to, to_pos)];
                let delta = engine.evaluate(&mut batch, &rs).unwrap();
                let after = engine.apply_to(&batch, &rs).unwrap();
                let rebuilt: Vec<Route> = after.iter().map(|r| ex.rebuild(r).unwrap()).collect();
                prop_assert_eq!(delta, max_cost(&rebuilt) - max_cost(&rs));
                for r in &after {
                    prop_assert!(r.check(&g).is_ok());
                }
            }
        }
    }
}
