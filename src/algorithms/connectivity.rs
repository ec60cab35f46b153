//! Connectivity checks.

use std::collections::VecDeque;

use crate::graph::{Graph, LinkId, VertexId};

/// Vertices reachable from `start` using only `links`.
///
/// With `respect_direction`, directed links are followed tail → head (or
/// head → tail when `reverse` is set); otherwise direction is ignored.
pub(crate) fn reachable(
    graph: &Graph,
    start: VertexId,
    links: &[LinkId],
    respect_direction: bool,
    reverse: bool,
) -> Vec<bool> {
    let n = graph.num_vertices();
    let mut adjacent: Vec<Vec<VertexId>> = vec![Vec::new(); n + 1];
    for link in links.iter().filter_map(|&l| graph.link(l)) {
        let (a, b) = link.endpoints();
        if respect_direction && link.is_directed() {
            if reverse {
                adjacent[b].push(a);
            } else {
                adjacent[a].push(b);
            }
        } else {
            adjacent[a].push(b);
            adjacent[b].push(a);
        }
    }

    let mut seen = vec![false; n + 1];
    if !graph.contains_vertex(start) {
        return seen;
    }
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    while let Some(v) = queue.pop_front() {
        for &w in &adjacent[v] {
            if !seen[w] {
                seen[w] = true;
                queue.push_back(w);
            }
        }
    }
    seen
}

fn all_links(graph: &Graph) -> Vec<LinkId> {
    graph.links().map(|l| l.id()).collect()
}

/// `true` if every vertex is reachable from every other, ignoring direction.
///
/// # Examples
///
/// ```
/// use u_arc_routing::algorithms::is_connected;
/// use u_arc_routing::graph::{Graph, GraphKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Directed, 3);
/// g.add_arc(1, 2, 1, true).unwrap();
/// assert!(!is_connected(&g));
/// g.add_arc(3, 2, 1, true).unwrap();
/// assert!(is_connected(&g));
/// ```
pub fn is_connected(graph: &Graph) -> bool {
    if graph.num_vertices() == 0 {
        return true;
    }
    let seen = reachable(graph, 1, &all_links(graph), false, false);
    seen.iter().skip(1).all(|&s| s)
}

/// `true` if every vertex can reach every other respecting link direction.
pub fn is_strongly_connected(graph: &Graph) -> bool {
    if graph.num_vertices() == 0 {
        return true;
    }
    let links = all_links(graph);
    let forward = reachable(graph, 1, &links, true, false);
    let backward = reachable(graph, 1, &links, true, true);
    forward.iter().zip(&backward).skip(1).all(|(&f, &b)| f && b)
}

/// Weakly connected components of the subgraph formed by `links`.
///
/// Only vertices touched by a link are labelled; the rest stay in no
/// component. Components are listed by their smallest vertex id.
pub fn link_components(graph: &Graph, links: &[LinkId]) -> Vec<Vec<VertexId>> {
    let n = graph.num_vertices();
    let mut touched = vec![false; n + 1];
    for link in links.iter().filter_map(|&l| graph.link(l)) {
        touched[link.first()] = true;
        touched[link.second()] = true;
    }
    let mut assigned = vec![false; n + 1];
    let mut components = Vec::new();
    for v in 1..=n {
        if !touched[v] || assigned[v] {
            continue;
        }
        let seen = reachable(graph, v, links, false, false);
        let members: Vec<VertexId> = (1..=n).filter(|&w| seen[w]).collect();
        for &w in &members {
            assigned[w] = true;
        }
        components.push(members);
    }
    components
}
