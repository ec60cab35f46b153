//! Perturbations used to escape local optima.

use log::debug;
use rand::Rng;

use super::{ImprovementConfig, IntraRouteImprovementProcedure};
use crate::distance::ShortestPaths;
use crate::error::Result;
use crate::graph::{Graph, LinkId};
use crate::moves::{CompactMove, MoveEngine};
use crate::route::Route;
use crate::solver::route_tasks;

/// Swaps two random serviced positions of a route.
///
/// The swap is a chained pair of same-route moves: the first link is
/// moved in front of the second, then the second is moved into the gap.
#[derive(Debug, Clone, Copy)]
pub struct TwoSwapPerturb<'a> {
    engine: MoveEngine<'a>,
    seed: u64,
}

impl<'a> TwoSwapPerturb<'a> {
    /// Creates the perturbation; `improve_route` draws from `config.seed`.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths, config: &ImprovementConfig) -> Self {
        Self {
            engine: MoveEngine::new(graph, paths),
            seed: config.seed,
        }
    }

    /// The move pair exchanging compact positions `a` and `b`.
    pub fn swap_moves(route: usize, a: usize, b: usize) -> [CompactMove; 2] {
        if a < b {
            [
                CompactMove::unchecked(route, a, route, b),
                CompactMove::unchecked(route, b, route, a),
            ]
        } else {
            [
                CompactMove::unchecked(route, a, route, b),
                CompactMove::unchecked(route, b + 1, route, a + 1),
            ]
        }
    }

    /// Swaps two distinct random positions of `route`.
    ///
    /// Routes with fewer than two serviced links are returned unchanged.
    pub fn perturb<R: Rng>(&self, route: &Route, rng: &mut R) -> Result<Route> {
        let n = route.compact().len();
        if n < 2 {
            return Ok(route.clone());
        }
        let a = rng.random_range(0..n);
        let mut b = rng.random_range(0..n);
        if a == b {
            b = (b + 1) % n;
        }
        let batch = Self::swap_moves(0, a, b);
        let mut changed = self.engine.apply(&batch, std::slice::from_ref(route))?;
        Ok(changed.remove(&0).unwrap_or_else(|| route.clone()))
    }
}

impl IntraRouteImprovementProcedure for TwoSwapPerturb<'_> {
    fn improve_route(&self, route: &Route) -> Result<Route> {
        let mut rng = u_numflow::random::create_rng(self.seed);
        self.perturb(route, &mut rng)
    }
}

/// Rotates partition centres around the centre of the graph and re-routes
/// each resulting partition.
///
/// Each route's centre is the mean of its serviced links' endpoint
/// coordinates. After rotating every centre by the angle, each serviced
/// link goes to the centre nearest its midpoint and every partition is
/// solved again as a single-vehicle problem. Needs coordinates on every
/// vertex touched by a serviced link; otherwise the routes are returned
/// unchanged.
#[derive(Debug, Clone)]
pub struct RouteRotator<'a> {
    graph: &'a Graph,
    paths: &'a ShortestPaths,
    config: ImprovementConfig,
}

fn centre(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    Some((sx / n, sy / n))
}

fn rotate(point: (f64, f64), about: (f64, f64), angle: f64) -> (f64, f64) {
    let (dx, dy) = (point.0 - about.0, point.1 - about.1);
    let r = dx.hypot(dy);
    let theta = dy.atan2(dx) + angle;
    (about.0 + r * theta.cos(), about.1 + r * theta.sin())
}

impl<'a> RouteRotator<'a> {
    /// Creates the rotator; `config` drives the per-partition descent.
    pub fn new(graph: &'a Graph, paths: &'a ShortestPaths, config: &ImprovementConfig) -> Self {
        Self {
            graph,
            paths,
            config: config.clone(),
        }
    }

    fn link_points(&self, id: LinkId) -> Option<[(f64, f64); 2]> {
        let link = self.graph.link(id)?;
        let a = self.graph.vertex(link.first())?.coordinates()?;
        let b = self.graph.vertex(link.second())?.coordinates()?;
        Some([a, b])
    }

    /// Whether every serviced link of `routes` has coordinates.
    pub fn applicable(&self, routes: &[Route]) -> bool {
        routes
            .iter()
            .flat_map(|r| r.compact().links().iter())
            .all(|&id| self.link_points(id).is_some())
    }

    /// Rotates by `angle` radians and re-solves each partition.
    ///
    /// The result has as many routes as the input; partitions that attract
    /// no link become empty tours.
    pub fn rotate(&self, routes: &[Route], angle: f64) -> Result<Vec<Route>> {
        if routes.len() <= 1 || !self.applicable(routes) {
            return Ok(routes.to_vec());
        }

        let mut centres = Vec::with_capacity(routes.len());
        let mut all = Vec::new();
        for route in routes {
            let mut pts = Vec::new();
            for &id in route.compact().links() {
                if let Some(p) = self.link_points(id) {
                    pts.extend_from_slice(&p);
                }
            }
            all.extend_from_slice(&pts);
            centres.push(centre(&pts));
        }
        let vertex_points: Vec<(f64, f64)> = self.graph.vertices().filter_map(|v| v.coordinates()).collect();
        let Some(about) = centre(&vertex_points).or_else(|| centre(&all)) else {
            return Ok(routes.to_vec());
        };
        let rotated: Vec<Option<(f64, f64)>> = centres.iter().map(|c| c.map(|p| rotate(p, about, angle))).collect();

        let mut parts: Vec<Vec<LinkId>> = vec![Vec::new(); routes.len()];
        for route in routes {
            for &id in route.compact().links() {
                let Some([a, b]) = self.link_points(id) else {
                    continue;
                };
                let mid = ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5);
                let mut closest: Option<(f64, usize)> = None;
                for (k, c) in rotated.iter().enumerate() {
                    let Some(c) = c else { continue };
                    let d = (c.0 - mid.0).hypot(c.1 - mid.1);
                    if closest.map_or(true, |(best, _)| d < best) {
                        closest = Some((d, k));
                    }
                }
                if let Some((_, k)) = closest {
                    parts[k].push(id);
                }
            }
        }

        let mut out = Vec::with_capacity(routes.len());
        for (k, tasks) in parts.iter().enumerate() {
            let kind = routes[k].kind();
            out.push(route_tasks(self.graph, self.paths, tasks, kind, &self.config)?);
        }
        debug!(
            "rotated {} partitions by {:.3} rad: sizes {:?}",
            out.len(),
            angle,
            parts.iter().map(Vec::len).collect::<Vec<_>>()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphKind;
    use crate::route::{CompactRoute, RouteExpander, RouteKind};

    fn star_with_coordinates() -> Graph {
        let mut g = Graph::new(GraphKind::Undirected);
        g.add_vertex_at(0.0, 0.0);
        for (x, y) in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)] {
            g.add_vertex_at(x, y);
        }
        for v in 2..=5 {
            g.add_edge(1, v, 1, true).unwrap();
        }
        g
    }

    fn build(g: &Graph, sp: &ShortestPaths, parts: &[&[usize]]) -> Vec<Route> {
        let ex = RouteExpander::new(g, sp);
        parts
            .iter()
            .map(|p| ex.unflatten(&CompactRoute::forward_only(p.to_vec()), RouteKind::Tour).unwrap())
            .collect()
    }

    #[test]
    fn test_swap_moves_exchange_positions() {
        let g = star_with_coordinates();
        let sp = ShortestPaths::compute(&g);
        let routes = build(&g, &sp, &[&[1, 2, 3, 4]]);
        let engine = MoveEngine::new(&g, &sp);
        for (a, b) in [(0, 3), (3, 0), (1, 2), (2, 1)] {
            let out = engine.apply_to(&TwoSwapPerturb::swap_moves(0, a, b), &routes).unwrap();
            let mut expected = vec![1, 2, 3, 4];
            expected.swap(a, b);
            assert_eq!(out[0].compact().links(), expected.as_slice(), "swap {a} {b}");
        }
    }

    #[test]
    fn test_perturb_keeps_tasks() {
        let g = star_with_coordinates();
        let sp = ShortestPaths::compute(&g);
        let routes = build(&g, &sp, &[&[1, 2, 3, 4]]);
        let p = TwoSwapPerturb::new(&g, &sp, &ImprovementConfig::default());
        let mut rng = u_numflow::random::create_rng(3);
        let out = p.perturb(&routes[0], &mut rng).unwrap();
        assert_ne!(out.compact().links(), routes[0].compact().links());
        let mut links = out.compact().links().to_vec();
        links.sort_unstable();
        assert_eq!(links, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rotation_reassigns_links() {
        let g = star_with_coordinates();
        let sp = ShortestPaths::compute(&g);
        // East+north in one route, west+south in the other.
        let routes = build(&g, &sp, &[&[1, 2], &[3, 4]]);
        let rotator = RouteRotator::new(&g, &sp, &ImprovementConfig::default());
        let out = rotator.rotate(&routes, std::f64::consts::FRAC_PI_2).unwrap();
        assert_eq!(out.len(), 2);
        let mut links: Vec<usize> = out.iter().flat_map(|r| r.compact().links().to_vec()).collect();
        links.sort_unstable();
        assert_eq!(links, vec![1, 2, 3, 4]);
        // After a quarter turn the first centre sits north-west and the
        // second south-east, so the east spoke changes hands.
        let first: Vec<usize> = out[0].compact().links().to_vec();
        assert!(first.contains(&2));
        assert!(!first.contains(&1));
    }

    #[test]
    fn test_rotation_needs_coordinates() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 1, true).unwrap();
        g.add_edge(1, 3, 1, true).unwrap();
        let sp = ShortestPaths::compute(&g);
        let routes = build(&g, &sp, &[&[1], &[2]]);
        let rotator = RouteRotator::new(&g, &sp, &ImprovementConfig::default());
        assert!(!rotator.applicable(&routes));
        assert_eq!(rotator.rotate(&routes, 0.3).unwrap(), routes);
    }
}
