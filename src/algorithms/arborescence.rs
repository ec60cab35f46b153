//! Minimum spanning arborescence oracle.

use crate::error::{Result, RoutingError};

/// Minimum-cost spanning arborescence over a complete digraph.
///
/// `weights` is source-major: `weights[u * n + v]` is the cost of `u → v`.
/// Entries equal to `i64::MAX` mark missing arcs. The result holds the
/// parent of every vertex, `None` for the root.
pub trait ArborescenceOracle {
    /// Computes the arborescence rooted at `root`.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Oracle`] for malformed input or when some vertex
    /// cannot be reached from the root.
    fn min_arborescence(&self, n: usize, root: usize, weights: &[i64]) -> Result<Vec<Option<usize>>>;
}

/// Chu–Liu/Edmonds with recursive cycle contraction.
///
/// # Examples
///
/// ```
/// use u_arc_routing::algorithms::{ArborescenceOracle, ChuLiuEdmonds};
///
/// let x = i64::MAX;
/// #[rustfmt::skip]
/// let weights = [
///     x, 5, 1,
///     x, x, x,
///     x, 2, x,
/// ];
/// let parents = ChuLiuEdmonds.min_arborescence(3, 0, &weights).unwrap();
/// assert_eq!(parents, vec![None, Some(2), Some(0)]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ChuLiuEdmonds;

#[derive(Debug, Clone, Copy)]
struct Arc {
    from: usize,
    to: usize,
    weight: i64,
}

/// Returns the index of the arc chosen to enter every non-root vertex
/// (`usize::MAX` for the root), or `None` if some vertex is unreachable.
fn edmonds(n: usize, root: usize, arcs: &[Arc]) -> Option<Vec<usize>> {
    let mut best: Vec<Option<usize>> = vec![None; n];
    for (k, a) in arcs.iter().enumerate() {
        if a.from == a.to || a.to == root {
            continue;
        }
        if best[a.to].map_or(true, |b| a.weight < arcs[b].weight) {
            best[a.to] = Some(k);
        }
    }
    let mut entering = vec![usize::MAX; n];
    for v in 0..n {
        if v != root {
            entering[v] = best[v]?;
        }
    }

    // Label cycles of the chosen in-arcs.
    let mut component = vec![usize::MAX; n];
    let mut in_cycle = vec![false; n];
    let mut visited_by = vec![usize::MAX; n];
    let mut cycles = 0;
    for start in 0..n {
        let mut v = start;
        while v != root && visited_by[v] == usize::MAX {
            visited_by[v] = start;
            v = arcs[entering[v]].from;
        }
        if v != root && visited_by[v] == start && component[v] == usize::MAX {
            let mut u = v;
            loop {
                component[u] = cycles;
                in_cycle[u] = true;
                u = arcs[entering[u]].from;
                if u == v {
                    break;
                }
            }
            cycles += 1;
        }
    }
    if cycles == 0 {
        return Some(entering);
    }

    let mut next_id = cycles;
    for c in component.iter_mut() {
        if *c == usize::MAX {
            *c = next_id;
            next_id += 1;
        }
    }

    let mut contracted = Vec::new();
    let mut origin = Vec::new();
    for (k, a) in arcs.iter().enumerate() {
        let (cu, cv) = (component[a.from], component[a.to]);
        if cu == cv {
            continue;
        }
        let reduction = if in_cycle[a.to] {
            arcs[entering[a.to]].weight
        } else {
            0
        };
        contracted.push(Arc {
            from: cu,
            to: cv,
            weight: a.weight.saturating_sub(reduction),
        });
        origin.push(k);
    }

    let inner = edmonds(next_id, component[root], &contracted)?;
    let mut chosen = vec![usize::MAX; n];
    for (c, &k) in inner.iter().enumerate() {
        if c == component[root] {
            continue;
        }
        let original = origin[k];
        chosen[arcs[original].to] = original;
    }
    for v in 0..n {
        if v != root && chosen[v] == usize::MAX {
            chosen[v] = entering[v];
        }
    }
    Some(chosen)
}

impl ArborescenceOracle for ChuLiuEdmonds {
    fn min_arborescence(&self, n: usize, root: usize, weights: &[i64]) -> Result<Vec<Option<usize>>> {
        if weights.len() != n * n {
            return Err(RoutingError::Oracle(format!(
                "expected {} weights for {} vertices, got {}",
                n * n,
                n,
                weights.len()
            )));
        }
        if n == 0 {
            return Ok(Vec::new());
        }
        if root >= n {
            return Err(RoutingError::Oracle(format!("root {root} out of range")));
        }
        let arcs: Vec<Arc> = (0..n)
            .flat_map(|u| (0..n).map(move |v| (u, v)))
            .filter(|&(u, v)| u != v && weights[u * n + v] != i64::MAX)
            .map(|(u, v)| Arc {
                from: u,
                to: v,
                weight: weights[u * n + v],
            })
            .collect();
        let chosen = edmonds(n, root, &arcs).ok_or_else(|| {
            RoutingError::Oracle(format!("not every vertex is reachable from root {root}"))
        })?;
        Ok(chosen
            .iter()
            .enumerate()
            .map(|(v, &k)| (v != root).then(|| arcs[k].from))
            .collect())
    }
}
