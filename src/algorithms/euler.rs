//! Eulerian checks and Hierholzer's algorithm.

use log::debug;

use super::connectivity::reachable;
use crate::error::{Result, RoutingError};
use crate::graph::{DegreeRecord, DegreeUpdatePolicy, Graph, GraphKind, LinkId, VertexId};

/// One oriented step of an Euler tour: the link and whether it is
/// traversed first → second.
pub type Step = (LinkId, bool);

fn links_connected(graph: &Graph) -> bool {
    let links: Vec<LinkId> = graph.links().map(|l| l.id()).collect();
    let Some(start) = graph.links().next().map(|l| l.first()) else {
        return true;
    };
    let seen = reachable(graph, start, &links, false, false);
    graph
        .vertices()
        .all(|v| v.degree().total() == 0 || seen[v.id()])
}

/// `true` if the graph admits a closed walk using every link exactly once.
///
/// Undirected-style graphs need even degrees, directed graphs balanced
/// in/out degrees, and mixed graphs both (even total degree with balanced
/// arcs, which is sufficient). Vertices without links are ignored.
///
/// # Examples
///
/// ```
/// use u_arc_routing::algorithms::is_eulerian;
/// use u_arc_routing::graph::{Graph, GraphKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
/// g.add_edge(1, 2, 1, true).unwrap();
/// g.add_edge(2, 3, 1, true).unwrap();
/// assert!(!is_eulerian(&g));
/// g.add_edge(3, 1, 1, true).unwrap();
/// assert!(is_eulerian(&g));
/// ```
pub fn is_eulerian(graph: &Graph) -> bool {
    let degrees_ok = graph.vertices().all(|v| match *v.degree() {
        DegreeRecord::Undirected { degree } => degree % 2 == 0,
        DegreeRecord::Directed {
            in_degree,
            out_degree,
        } => in_degree == out_degree,
        DegreeRecord::Mixed {
            degree,
            in_degree,
            out_degree,
        } => in_degree == out_degree && (degree + in_degree + out_degree) % 2 == 0,
    });
    degrees_ok && links_connected(graph)
}

/// Iterative Hierholzer over per-vertex option lists `(link, next, forward)`.
fn hierholzer(
    options: &[Vec<(LinkId, VertexId, bool)>],
    start: VertexId,
    used: &mut [bool],
) -> Vec<Step> {
    let mut cursor = vec![0usize; options.len()];
    let mut stack: Vec<(VertexId, Option<Step>)> = vec![(start, None)];
    let mut circuit = Vec::new();
    while let Some(&(v, via)) = stack.last() {
        let mut advanced = false;
        while cursor[v] < options[v].len() {
            let (link, next, forward) = options[v][cursor[v]];
            cursor[v] += 1;
            if !used[link] {
                used[link] = true;
                stack.push((next, Some((link, forward))));
                advanced = true;
                break;
            }
        }
        if !advanced {
            stack.pop();
            if let Some(step) = via {
                circuit.push(step);
            }
        }
    }
    circuit.reverse();
    circuit
}

fn max_link_id(graph: &Graph) -> usize {
    graph.links().map(|l| l.id()).max().unwrap_or(0)
}

/// Orients undirected mixed links along Euler circuits of the undirected
/// subgraph, returning the direction chosen for each link id.
fn orient_undirected(graph: &Graph) -> Vec<Option<bool>> {
    let n = graph.num_vertices();
    let mut options = vec![Vec::new(); n + 1];
    for link in graph.links().filter(|l| !l.is_directed()) {
        let (a, b) = link.endpoints();
        options[a].push((link.id(), b, true));
        options[b].push((link.id(), a, false));
    }
    let mut used = vec![false; max_link_id(graph) + 1];
    let mut orientation = vec![None; used.len()];
    for v in 1..=n {
        for (link, forward) in hierholzer(&options, v, &mut used) {
            orientation[link] = Some(forward);
        }
    }
    orientation
}

/// Computes a closed walk from `start` using every link exactly once.
///
/// # Errors
///
/// [`RoutingError::UnknownVertex`] for a bad start,
/// [`RoutingError::NotEulerian`] if degrees or connectivity rule a tour out.
pub fn euler_tour(graph: &Graph, start: VertexId) -> Result<Vec<Step>> {
    if !graph.contains_vertex(start) {
        return Err(RoutingError::UnknownVertex(start));
    }
    if !is_eulerian(graph) {
        return Err(RoutingError::NotEulerian(format!(
            "{} graph has unbalanced or disconnected links",
            graph.kind().name()
        )));
    }
    if graph.num_links() == 0 {
        return Ok(Vec::new());
    }
    if graph.vertex(start).is_some_and(|v| v.degree().total() == 0) {
        return Err(RoutingError::NotEulerian(format!(
            "start vertex {} has no incident links",
            start
        )));
    }

    let orientation = if graph.kind() == GraphKind::Mixed {
        orient_undirected(graph)
    } else {
        Vec::new()
    };
    let n = graph.num_vertices();
    let mut options = vec![Vec::new(); n + 1];
    for link in graph.links() {
        let (a, b) = link.endpoints();
        let fixed = if link.is_directed() {
            Some(true)
        } else {
            orientation.get(link.id()).copied().flatten()
        };
        match fixed {
            Some(true) => options[a].push((link.id(), b, true)),
            Some(false) => options[b].push((link.id(), a, false)),
            None => {
                options[a].push((link.id(), b, true));
                options[b].push((link.id(), a, false));
            }
        }
    }

    let mut used = vec![false; max_link_id(graph) + 1];
    let tour = hierholzer(&options, start, &mut used);
    if tour.len() != graph.num_links() {
        return Err(RoutingError::NotEulerian(format!(
            "walk from {} covered {} of {} links",
            start,
            tour.len(),
            graph.num_links()
        )));
    }
    debug!("euler tour of {} links from vertex {}", tour.len(), start);
    Ok(tour)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_closed_walk(graph: &Graph, start: VertexId, tour: &[Step]) {
        let mut cur = start;
        for &(l, forward) in tour {
            let link = graph.link(l).unwrap();
            assert_eq!(link.start(forward), cur);
            if link.is_directed() {
                assert!(forward);
            }
            cur = link.end(forward);
        }
        assert_eq!(cur, start);
    }

    #[test]
    fn test_undirected_tour_with_self_loop() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 1, true).unwrap();
        g.add_edge(2, 3, 1, true).unwrap();
        g.add_edge(3, 1, 1, true).unwrap();
        g.add_edge(2, 2, 1, true).unwrap();
        let tour = euler_tour(&g, 1).unwrap();
        assert_eq!(tour.len(), 4);
        assert_closed_walk(&g, 1, &tour);
    }

    #[test]
    fn test_directed_tour() {
        let mut g = Graph::with_vertices(GraphKind::Directed, 3);
        g.add_arc(1, 2, 1, true).unwrap();
        g.add_arc(2, 1, 1, true).unwrap();
        g.add_arc(2, 3, 1, true).unwrap();
        g.add_arc(3, 2, 1, true).unwrap();
        let tour = euler_tour(&g, 3).unwrap();
        assert_eq!(tour.len(), 4);
        assert_closed_walk(&g, 3, &tour);
    }

    #[test]
    fn test_mixed_tour_respects_arcs() {
        let mut g = Graph::with_vertices(GraphKind::Mixed, 4);
        g.add_mixed_edge(1, 2, 1, true, true).unwrap();
        g.add_mixed_edge(2, 1, 1, true, true).unwrap();
        g.add_mixed_edge(2, 3, 1, false, true).unwrap();
        g.add_mixed_edge(3, 4, 1, false, true).unwrap();
        g.add_mixed_edge(4, 2, 1, false, true).unwrap();
        assert!(is_eulerian(&g));
        let tour = euler_tour(&g, 1).unwrap();
        assert_eq!(tour.len(), 5);
        assert_closed_walk(&g, 1, &tour);
    }

    #[test]
    fn test_rejects_odd_degrees() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 2);
        g.add_edge(1, 2, 1, true).unwrap();
        assert!(matches!(
            euler_tour(&g, 1),
            Err(RoutingError::NotEulerian(_))
        ));
    }

    #[test]
    fn test_rejects_disconnected_cycles() {
        let mut g = Graph::with_vertices(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 1, true).unwrap();
        g.add_edge(2, 1, 1, true).unwrap();
        g.add_edge(3, 4, 1, true).unwrap();
        g.add_edge(4, 3, 1, true).unwrap();
        assert!(!is_eulerian(&g));
    }
}
