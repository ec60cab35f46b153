//! Odd-vertex T-join restoration through the matching oracle.

use log::debug;

use super::MatchingOracle;
use crate::distance::ShortestPaths;
use crate::error::{Result, RoutingError};
use crate::graph::{Graph, LinkId, VertexId};

/// Vertices with odd degree in the subgraph formed by `links`.
pub fn odd_vertices(graph: &Graph, links: &[LinkId]) -> Vec<VertexId> {
    let mut degree = vec![0usize; graph.num_vertices() + 1];
    for link in links.iter().filter_map(|&l| graph.link(l)) {
        degree[link.first()] += 1;
        degree[link.second()] += 1;
    }
    (1..degree.len()).filter(|&v| degree[v] % 2 == 1).collect()
}

/// Shortest paths whose duplication makes every vertex of the `links`
/// subgraph even.
///
/// Odd vertices are paired by `oracle` on their complete graph weighted by
/// shortest-path distance; each pair contributes the link ids of a
/// shortest path between them.
///
/// # Errors
///
/// [`RoutingError::Disconnected`] if two odd vertices cannot reach each
/// other, or any oracle failure.
pub fn parity_paths(
    graph: &Graph,
    paths: &ShortestPaths,
    links: &[LinkId],
    oracle: &dyn MatchingOracle,
) -> Result<Vec<Vec<LinkId>>> {
    let odd = odd_vertices(graph, links);
    if odd.is_empty() {
        return Ok(Vec::new());
    }
    let mut edges = Vec::new();
    let mut weights = Vec::new();
    for i in 0..odd.len() {
        for j in (i + 1)..odd.len() {
            edges.push((i, j));
            weights.push(paths.require_distance(odd[i], odd[j])?);
        }
    }
    let mate = oracle.perfect_matching(odd.len(), &edges, &weights)?;
    if mate.len() != odd.len() {
        return Err(RoutingError::Oracle(format!(
            "matching returned {} mates for {} vertices",
            mate.len(),
            odd.len()
        )));
    }

    let mut out = Vec::new();
    for (i, &m) in mate.iter().enumerate() {
        if i < m {
            let path = paths
                .link_path(odd[i], odd[m])
                .ok_or(RoutingError::Disconnected {
                    from: odd[i],
                    to: odd[m],
                })?;
            out.push(path);
        }
    }
    debug!("paired {} odd vertices", odd.len());
    Ok(out)
}
