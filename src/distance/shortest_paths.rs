//! All-pairs shortest paths with path reconstruction.

use log::debug;

use super::{DistanceMatrix, UNREACHABLE};
use crate::error::{Result, RoutingError};
use crate::graph::{Graph, LinkId, VertexId};

/// Immutable all-pairs shortest-path snapshot of one graph generation.
///
/// Matrices are `(n+1)×(n+1)` so that vertex ids index them directly; row
/// and column 0 are unused. `next_hop[i][j]` is the vertex after `i` on a
/// shortest `i → j` path and `link_on_path[i][j]` the link used for that
/// first step. Zero marks "none" in both.
///
/// Mutating the graph invalidates the snapshot.
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::distance::ShortestPaths;
///
/// let mut g = Graph::with_vertices(GraphKind::Directed, 3);
/// g.add_arc(1, 2, 4, true).unwrap();
/// g.add_arc(2, 3, 1, true).unwrap();
/// g.add_arc(1, 3, 9, false).unwrap();
///
/// let sp = ShortestPaths::compute(&g);
/// assert_eq!(sp.distance(1, 3), Some(5));
/// assert_eq!(sp.distance(3, 1), None);
/// assert_eq!(sp.path(1, 3), Some(vec![1, 2, 3]));
/// ```
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    dist: DistanceMatrix,
    next_hop: Vec<VertexId>,
    link_on_path: Vec<LinkId>,
    size: usize,
}

impl ShortestPaths {
    /// Runs Floyd–Warshall over `graph`.
    ///
    /// Parallel links are resolved to the cheapest, first found on ties.
    /// Directed links seed only their forward direction; all others also
    /// seed the reverse direction with their reverse cost.
    pub fn compute(graph: &Graph) -> Self {
        let n = graph.num_vertices();
        let size = n + 1;
        let mut dist = DistanceMatrix::new(size);
        let mut next_hop = vec![0; size * size];
        let mut link_on_path = vec![0; size * size];

        for link in graph.links() {
            let (i, j) = link.endpoints();
            if i == j {
                continue;
            }
            let mut seed = |from: usize, to: usize, cost: i64| {
                if cost < dist.raw(from, to) {
                    dist.set(from, to, cost);
                    next_hop[from * size + to] = to;
                    link_on_path[from * size + to] = link.id();
                }
            };
            seed(i, j, link.cost());
            if !link.is_directed() {
                seed(j, i, link.reverse_cost());
            }
        }

        for k in 1..size {
            for i in 1..size {
                let dik = dist.raw(i, k);
                if dik == UNREACHABLE {
                    continue;
                }
                for j in 1..size {
                    let dkj = dist.raw(k, j);
                    if dkj == UNREACHABLE {
                        continue;
                    }
                    let through = dik.saturating_add(dkj);
                    if through < dist.raw(i, j) {
                        dist.set(i, j, through);
                        next_hop[i * size + j] = next_hop[i * size + k];
                        link_on_path[i * size + j] = link_on_path[i * size + k];
                    }
                }
            }
        }
        debug!("computed all-pairs shortest paths over {} vertices", n);

        Self {
            dist,
            next_hop,
            link_on_path,
            size,
        }
    }

    /// Number of graph vertices covered.
    pub fn num_vertices(&self) -> usize {
        self.size - 1
    }

    fn in_range(&self, v: VertexId) -> bool {
        v >= 1 && v < self.size
    }

    /// Shortest distance, `None` if unreachable or out of range.
    pub fn distance(&self, from: VertexId, to: VertexId) -> Option<i64> {
        if !self.in_range(from) || !self.in_range(to) {
            return None;
        }
        self.dist.get(from, to)
    }

    /// Shortest distance, failing with [`RoutingError::Disconnected`].
    pub fn require_distance(&self, from: VertexId, to: VertexId) -> Result<i64> {
        self.distance(from, to)
            .ok_or(RoutingError::Disconnected { from, to })
    }

    /// Vertex following `from` on a shortest path to `to`.
    pub fn next_hop(&self, from: VertexId, to: VertexId) -> Option<VertexId> {
        if !self.in_range(from) || !self.in_range(to) {
            return None;
        }
        let v = self.next_hop[from * self.size + to];
        (v != 0).then_some(v)
    }

    /// First link on a shortest path from `from` to `to`.
    pub fn link_on_path(&self, from: VertexId, to: VertexId) -> Option<LinkId> {
        if !self.in_range(from) || !self.in_range(to) {
            return None;
        }
        let l = self.link_on_path[from * self.size + to];
        (l != 0).then_some(l)
    }

    /// Vertex sequence of a shortest path, both ends included.
    ///
    /// `Some(vec![v])` for `from == to`.
    pub fn path(&self, from: VertexId, to: VertexId) -> Option<Vec<VertexId>> {
        self.distance(from, to)?;
        let mut out = vec![from];
        let mut cur = from;
        while cur != to {
            cur = self.next_hop(cur, to)?;
            out.push(cur);
        }
        Some(out)
    }

    /// Link ids of a shortest path in traversal order.
    pub fn link_path(&self, from: VertexId, to: VertexId) -> Option<Vec<LinkId>> {
        self.distance(from, to)?;
        let mut out = Vec::new();
        let mut cur = from;
        while cur != to {
            out.push(self.link_on_path(cur, to)?);
            cur = self.next_hop(cur, to)?;
        }
        Some(out)
    }

    /// Links of a shortest path paired with the vertex each is entered
    /// from, failing with [`RoutingError::Disconnected`].
    pub fn require_link_path(&self, from: VertexId, to: VertexId) -> Result<Vec<(LinkId, VertexId)>> {
        self.require_distance(from, to)?;
        let mut out = Vec::new();
        let mut cur = from;
        while cur != to {
            let link = self
                .link_on_path(cur, to)
                .ok_or(RoutingError::Disconnected { from: cur, to })?;
            let next = self
                .next_hop(cur, to)
                .ok_or(RoutingError::Disconnected { from: cur, to })?;
            out.push((link, cur));
            cur = next;
        }
        Ok(out)
    }

    /// Fails with [`RoutingError::Disconnected`] on the first unreachable
    /// ordered pair.
    pub fn require_connected(&self) -> Result<()> {
        for i in 1..self.size {
            for j in 1..self.size {
                if self.dist.raw(i, j) == UNREACHABLE {
                    return Err(RoutingError::Disconnected { from: i, to: j });
                }
            }
        }
        Ok(())
    }

    /// The underlying distance matrix (row and column 0 unused).
    pub fn matrix(&self) -> &DistanceMatrix {
        &self.dist
    }
}
