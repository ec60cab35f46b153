//! Minimum-cost perfect matching oracle.

use log::warn;

use crate::error::{Result, RoutingError};

/// Largest order solved exactly by [`ReferenceMatching`].
pub const EXACT_MATCHING_LIMIT: usize = 20;

/// Minimum-cost perfect matching over an undirected weighted edge list.
///
/// Vertices are `0..n`; `edges[k]` has weight `weights[k]`. The result is
/// `mate[i]`, the vertex matched with `i`.
pub trait MatchingOracle {
    /// Computes a perfect matching.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Oracle`] if the input is malformed or admits no
    /// perfect matching.
    fn perfect_matching(&self, n: usize, edges: &[(usize, usize)], weights: &[i64]) -> Result<Vec<usize>>;
}

/// In-process matching: exact bitmask DP up to [`EXACT_MATCHING_LIMIT`]
/// vertices, greedy cheapest-edge-first above.
///
/// # Examples
///
/// ```
/// use u_arc_routing::algorithms::{MatchingOracle, ReferenceMatching};
///
/// let edges = [(0, 1), (2, 3), (0, 2), (1, 3), (0, 3), (1, 2)];
/// let weights = [1, 1, 5, 5, 9, 9];
/// let mate = ReferenceMatching.perfect_matching(4, &edges, &weights).unwrap();
/// assert_eq!(mate, vec![1, 0, 3, 2]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceMatching;

impl ReferenceMatching {
    fn weight_table(n: usize, edges: &[(usize, usize)], weights: &[i64]) -> Result<Vec<Option<i64>>> {
        if edges.len() != weights.len() {
            return Err(RoutingError::Oracle(format!(
                "{} edges but {} weights",
                edges.len(),
                weights.len()
            )));
        }
        let mut table = vec![None; n * n];
        for (&(a, b), &w) in edges.iter().zip(weights) {
            if a >= n || b >= n || a == b {
                return Err(RoutingError::Oracle(format!("bad matching edge ({a}, {b})")));
            }
            for (i, j) in [(a, b), (b, a)] {
                let slot = &mut table[i * n + j];
                if slot.map_or(true, |cur| w < cur) {
                    *slot = Some(w);
                }
            }
        }
        Ok(table)
    }

    fn exact(n: usize, table: &[Option<i64>]) -> Option<Vec<usize>> {
        let full = (1usize << n) - 1;
        let mut best: Vec<Option<i64>> = vec![None; full + 1];
        let mut choice = vec![(0usize, 0usize); full + 1];
        best[0] = Some(0);
        for mask in 0..full {
            let Some(base) = best[mask] else { continue };
            let i = (!mask).trailing_zeros() as usize;
            for j in (i + 1)..n {
                if mask & (1 << j) != 0 {
                    continue;
                }
                let Some(w) = table[i * n + j] else { continue };
                let next = mask | (1 << i) | (1 << j);
                let cost = base + w;
                if best[next].map_or(true, |cur| cost < cur) {
                    best[next] = Some(cost);
                    choice[next] = (i, j);
                }
            }
        }
        best[full]?;
        let mut mate = vec![0; n];
        let mut mask = full;
        while mask != 0 {
            let (i, j) = choice[mask];
            mate[i] = j;
            mate[j] = i;
            mask &= !((1 << i) | (1 << j));
        }
        Some(mate)
    }

    fn greedy(n: usize, table: &[Option<i64>]) -> Option<Vec<usize>> {
        let mut pairs: Vec<(i64, usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter_map(|(i, j)| table[i * n + j].map(|w| (w, i, j)))
            .collect();
        pairs.sort_unstable();
        let mut mate = vec![usize::MAX; n];
        for (_, i, j) in pairs {
            if mate[i] == usize::MAX && mate[j] == usize::MAX {
                mate[i] = j;
                mate[j] = i;
            }
        }
        mate.iter().all(|&m| m != usize::MAX).then_some(mate)
    }
}

impl MatchingOracle for ReferenceMatching {
    fn perfect_matching(&self, n: usize, edges: &[(usize, usize)], weights: &[i64]) -> Result<Vec<usize>> {
        if n % 2 != 0 {
            return Err(RoutingError::Oracle(format!(
                "perfect matching needs an even vertex count, got {n}"
            )));
        }
        if n == 0 {
            return Ok(Vec::new());
        }
        let table = Self::weight_table(n, edges, weights)?;
        let mate = if n <= EXACT_MATCHING_LIMIT {
            Self::exact(n, &table)
        } else {
            warn!("matching over {} vertices uses the greedy fallback", n);
            Self::greedy(n, &table)
        };
        mate.ok_or_else(|| RoutingError::Oracle("no perfect matching exists".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(n: usize, weight: impl Fn(usize, usize) -> i64) -> (Vec<(usize, usize)>, Vec<i64>) {
        let mut edges = Vec::new();
        let mut weights = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
                weights.push(weight(i, j));
            }
        }
        (edges, weights)
    }

    fn cost(mate: &[usize], weight: impl Fn(usize, usize) -> i64) -> i64 {
        (0..mate.len())
            .filter(|&i| i < mate[i])
            .map(|i| weight(i, mate[i]))
            .sum()
    }

    #[test]
    fn test_exact_beats_greedy_trap() {
        // Greedy takes (1,2) at cost 1 and is left with (0,3) at 100.
        let w = |i: usize, j: usize| match (i, j) {
            (1, 2) => 1,
            (0, 1) | (2, 3) => 2,
            (0, 3) => 100,
            _ => 50,
        };
        let (edges, weights) = complete(4, w);
        let mate = ReferenceMatching.perfect_matching(4, &edges, &weights).unwrap();
        assert_eq!(cost(&mate, w), 4);
        let table = ReferenceMatching::weight_table(4, &edges, &weights).unwrap();
        let greedy = ReferenceMatching::greedy(4, &table).unwrap();
        assert_eq!(cost(&greedy, w), 101);
    }

    #[test]
    fn test_odd_order_rejected() {
        let err = ReferenceMatching.perfect_matching(3, &[(0, 1)], &[1]).unwrap_err();
        assert!(matches!(err, RoutingError::Oracle(_)));
    }

    #[test]
    fn test_missing_edges_rejected() {
        let err = ReferenceMatching
            .perfect_matching(4, &[(0, 1), (0, 2)], &[1, 1])
            .unwrap_err();
        assert!(matches!(err, RoutingError::Oracle(_)));
    }

    #[test]
    fn test_mate_is_involution_above_limit() {
        let n = 22;
        let (edges, weights) = complete(n, |i, j| (i as i64 - j as i64).abs());
        let mate = ReferenceMatching.perfect_matching(n, &edges, &weights).unwrap();
        for i in 0..n {
            assert_ne!(mate[i], i);
            assert_eq!(mate[mate[i]], i);
        }
    }

    #[test]
    fn test_empty() {
        assert!(ReferenceMatching.perfect_matching(0, &[], &[]).unwrap().is_empty());
    }
}
