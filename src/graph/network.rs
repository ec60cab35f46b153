//! The arena-backed graph.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;

use super::{
    DegreeUpdatePolicy, GraphKind, Link, LinkId, LinkSpec, Vertex, VertexId, ZigZagAttributes,
};
use crate::error::{Result, RoutingError};

static NEXT_GUID: AtomicUsize = AtomicUsize::new(1);

fn next_guid() -> usize {
    NEXT_GUID.fetch_add(1, Ordering::Relaxed)
}

/// A routing graph owning its vertices and links.
///
/// Vertices are numbered densely from 1 and are never removed. Link ids are
/// handed out by a monotonic per-graph counter; removed links leave a hole.
/// Every mutation keeps adjacency and degree records consistent.
///
/// # Examples
///
/// ```
/// use u_arc_routing::graph::{Graph, GraphKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
/// let a = g.add_edge(1, 2, 4, true).unwrap();
/// g.add_edge(2, 3, 1, false).unwrap();
/// assert_eq!(g.num_links(), 2);
/// assert_eq!(g.vertex(2).unwrap().degree().total(), 2);
///
/// g.remove_link(a).unwrap();
/// assert_eq!(g.vertex(1).unwrap().degree().total(), 0);
/// assert!(g.verify_degrees());
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    kind: GraphKind,
    vertices: Vec<Vertex>,
    links: Vec<Option<Link>>,
    adjacency: Vec<Vec<LinkId>>,
    vertex_guids: HashMap<usize, VertexId>,
    link_guids: HashMap<usize, LinkId>,
    num_links: usize,
    depot: VertexId,
}

impl Graph {
    /// Creates an empty graph of the given variant.
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
            links: Vec::new(),
            adjacency: Vec::new(),
            vertex_guids: HashMap::new(),
            link_guids: HashMap::new(),
            num_links: 0,
            depot: 1,
        }
    }

    /// Creates a graph with `n` vertices numbered `1..=n`.
    pub fn with_vertices(kind: GraphKind, n: usize) -> Self {
        let mut graph = Self::new(kind);
        graph.vertices.reserve(n);
        for _ in 0..n {
            graph.add_vertex();
        }
        graph
    }

    /// Graph variant.
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Depot vertex id.
    pub fn depot(&self) -> VertexId {
        self.depot
    }

    /// Sets the depot.
    pub fn set_depot(&mut self, depot: VertexId) -> Result<()> {
        if !self.contains_vertex(depot) {
            return Err(RoutingError::UnknownVertex(depot));
        }
        self.depot = depot;
        Ok(())
    }

    /// Adds a vertex with a fresh id and guid.
    pub fn add_vertex(&mut self) -> VertexId {
        self.insert_vertex(next_guid(), None, None)
    }

    /// Adds a vertex at the given planar coordinates.
    pub fn add_vertex_at(&mut self, x: f64, y: f64) -> VertexId {
        self.insert_vertex(next_guid(), None, Some((x, y)))
    }

    fn insert_vertex(
        &mut self,
        guid: usize,
        match_id: Option<VertexId>,
        coordinates: Option<(f64, f64)>,
    ) -> VertexId {
        let id = self.vertices.len() + 1;
        self.vertices.push(Vertex {
            id,
            guid,
            match_id,
            coordinates,
            degree: self.kind.initial_degree(),
        });
        self.adjacency.push(Vec::new());
        self.vertex_guids.insert(guid, id);
        id
    }

    /// Assigns coordinates to an existing vertex.
    pub fn set_coordinates(&mut self, v: VertexId, x: f64, y: f64) -> Result<()> {
        let vertex = self.vertex_mut(v).ok_or(RoutingError::UnknownVertex(v))?;
        vertex.coordinates = Some((x, y));
        Ok(())
    }

    /// Returns `true` if `v` is a vertex of this graph.
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        v >= 1 && v <= self.vertices.len()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Looks up a vertex by id.
    pub fn vertex(&self, v: VertexId) -> Option<&Vertex> {
        v.checked_sub(1).and_then(|i| self.vertices.get(i))
    }

    fn vertex_mut(&mut self, v: VertexId) -> Option<&mut Vertex> {
        v.checked_sub(1).and_then(|i| self.vertices.get_mut(i))
    }

    /// Looks up a vertex by guid.
    pub fn vertex_by_guid(&self, guid: usize) -> Option<&Vertex> {
        self.vertex_guids.get(&guid).and_then(|&v| self.vertex(v))
    }

    /// Vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    /// Admits a link described by `spec`.
    ///
    /// # Errors
    ///
    /// [`RoutingError::LinkTypeMismatch`] if the variant rejects the link
    /// type, [`RoutingError::InvalidEndpoints`] if an endpoint is missing.
    pub fn add_link(&mut self, spec: LinkSpec) -> Result<LinkId> {
        self.insert_link(spec, next_guid(), None)
    }

    fn insert_link(
        &mut self,
        spec: LinkSpec,
        guid: usize,
        match_id: Option<LinkId>,
    ) -> Result<LinkId> {
        if !self.kind.accepts(&spec.kind) {
            return Err(RoutingError::LinkTypeMismatch {
                graph: self.kind.name(),
                link: spec.kind.name(),
            });
        }
        if !self.contains_vertex(spec.first) || !self.contains_vertex(spec.second) {
            return Err(RoutingError::InvalidEndpoints {
                first: spec.first,
                second: spec.second,
            });
        }

        let id = self.links.len() + 1;
        let link = Link {
            id,
            guid,
            match_id,
            first: spec.first,
            second: spec.second,
            cost: spec.cost,
            required: spec.required,
            demand: spec.demand,
            kind: spec.kind,
        };
        self.attach(&link, true);
        self.adjacency[spec.first - 1].push(id);
        self.adjacency[spec.second - 1].push(id);
        self.link_guids.insert(guid, id);
        self.links.push(Some(link));
        self.num_links += 1;
        Ok(id)
    }

    fn attach(&mut self, link: &Link, insert: bool) {
        let (first, second) = self.kind.contribution(link);
        self.vertices[link.first - 1].degree.apply(first, insert);
        self.vertices[link.second - 1].degree.apply(second, insert);
    }

    /// Adds an undirected edge.
    pub fn add_edge(&mut self, i: VertexId, j: VertexId, cost: i64, required: bool) -> Result<LinkId> {
        self.add_link(LinkSpec::edge(i, j, cost).required(required))
    }

    /// Adds an arc `tail → head`.
    pub fn add_arc(&mut self, tail: VertexId, head: VertexId, cost: i64, required: bool) -> Result<LinkId> {
        self.add_link(LinkSpec::arc(tail, head, cost).required(required))
    }

    /// Adds a mixed-graph link.
    pub fn add_mixed_edge(
        &mut self,
        i: VertexId,
        j: VertexId,
        cost: i64,
        directed: bool,
        required: bool,
    ) -> Result<LinkId> {
        self.add_link(LinkSpec::mixed(i, j, cost, directed).required(required))
    }

    /// Adds a windy edge.
    pub fn add_windy_edge(
        &mut self,
        i: VertexId,
        j: VertexId,
        cost: i64,
        reverse_cost: i64,
        required: bool,
    ) -> Result<LinkId> {
        self.add_link(LinkSpec::windy(i, j, cost, reverse_cost).required(required))
    }

    /// Adds a zigzag link.
    pub fn add_zigzag_link(
        &mut self,
        i: VertexId,
        j: VertexId,
        cost: i64,
        attributes: ZigZagAttributes,
        required: bool,
    ) -> Result<LinkId> {
        self.add_link(LinkSpec::zigzag(i, j, cost, attributes).required(required))
    }

    /// Removes a link, detaching it from adjacency and degrees first.
    pub fn remove_link(&mut self, id: LinkId) -> Result<Link> {
        let link = id
            .checked_sub(1)
            .and_then(|i| self.links.get_mut(i))
            .and_then(Option::take)
            .ok_or(RoutingError::UnknownLink(id))?;
        self.attach(&link, false);
        self.adjacency[link.first - 1].retain(|&l| l != id);
        if link.second != link.first {
            self.adjacency[link.second - 1].retain(|&l| l != id);
        }
        self.link_guids.remove(&link.guid);
        self.num_links -= 1;
        debug!("removed link {} ({}-{})", id, link.first, link.second);
        Ok(link)
    }

    /// Looks up a link by id.
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        id.checked_sub(1)
            .and_then(|i| self.links.get(i))
            .and_then(Option::as_ref)
    }

    /// Looks up a link by id, failing with [`RoutingError::UnknownLink`].
    pub fn require_link(&self, id: LinkId) -> Result<&Link> {
        self.link(id).ok_or(RoutingError::UnknownLink(id))
    }

    /// Looks up a link by guid.
    pub fn link_by_guid(&self, guid: usize) -> Option<&Link> {
        self.link_guids.get(&guid).and_then(|&l| self.link(l))
    }

    /// Live links in ascending id order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().flatten()
    }

    /// Number of live links.
    pub fn num_links(&self) -> usize {
        self.num_links
    }

    /// Ids of the required links in ascending order.
    pub fn required_links(&self) -> Vec<LinkId> {
        self.links().filter(|l| l.required).map(|l| l.id).collect()
    }

    /// Changes the required flag of a link.
    pub fn set_required(&mut self, id: LinkId, required: bool) -> Result<()> {
        let link = id
            .checked_sub(1)
            .and_then(|i| self.links.get_mut(i))
            .and_then(Option::as_mut)
            .ok_or(RoutingError::UnknownLink(id))?;
        link.required = required;
        Ok(())
    }

    /// Link ids incident to `v` (a self-loop appears twice).
    ///
    /// Empty for unknown vertices.
    pub fn incident_links(&self, v: VertexId) -> &[LinkId] {
        v.checked_sub(1)
            .and_then(|i| self.adjacency.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct neighbours of `v`, ignoring link direction.
    pub fn neighbors(&self, v: VertexId) -> Vec<VertexId> {
        let mut out: Vec<VertexId> = self
            .incident_links(v)
            .iter()
            .filter_map(|&l| self.link(l))
            .filter_map(|l| l.other_endpoint(v))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Links joining `u` and `v` in either order.
    pub fn links_between(&self, u: VertexId, v: VertexId) -> Vec<LinkId> {
        let mut out: Vec<LinkId> = self
            .incident_links(u)
            .iter()
            .copied()
            .filter(|&l| self.link(l).is_some_and(|link| link.other_endpoint(u) == Some(v)))
            .collect();
        out.dedup();
        out
    }

    /// Recomputes every degree record and adjacency count from the links and
    /// compares with the stored state.
    pub fn verify_degrees(&self) -> bool {
        let mut degrees: Vec<_> = self
            .vertices
            .iter()
            .map(|_| self.kind.initial_degree())
            .collect();
        let mut incidences = vec![0usize; self.vertices.len()];
        for link in self.links() {
            let (first, second) = self.kind.contribution(link);
            degrees[link.first - 1].apply(first, true);
            degrees[link.second - 1].apply(second, true);
            incidences[link.first - 1] += 1;
            incidences[link.second - 1] += 1;
        }
        self.vertices.iter().enumerate().all(|(i, vertex)| {
            vertex.degree == degrees[i]
                && self.adjacency[i].len() == incidences[i]
                && vertex.degree.total() == incidences[i]
        })
    }

    /// Copies the graph into a fresh identity space.
    ///
    /// Vertex and link guids are preserved; `match_id` records the source ids.
    /// Links are recreated in ascending source id order, so the copy's link
    /// ids are dense even if the source had removals.
    ///
    /// # Errors
    ///
    /// Any link the copy refuses to admit is reported as it would be by
    /// [`add_link`](Self::add_link).
    pub fn deep_copy(&self) -> Result<Self> {
        let mut copy = Self::new(self.kind);
        for vertex in &self.vertices {
            copy.insert_vertex(vertex.guid, Some(vertex.id), vertex.coordinates);
        }
        for link in self.links() {
            let spec = LinkSpec {
                first: link.first,
                second: link.second,
                cost: link.cost,
                required: link.required,
                demand: link.demand,
                kind: link.kind,
            };
            copy.insert_link(spec, link.guid, Some(link.id))?;
        }
        copy.depot = self.depot;
        Ok(copy)
    }

    /// Copy whose required set is exactly `required` (ids of this graph).
    ///
    /// Used to split a problem into per-vehicle parts. The returned map
    /// translates copy link ids back to source ids.
    pub fn restricted_copy(&self, required: &[LinkId]) -> Result<(Self, HashMap<LinkId, LinkId>)> {
        let mut copy = self.deep_copy()?;
        let mut back = HashMap::new();
        let ids: Vec<LinkId> = copy.links().map(|l| l.id).collect();
        for id in ids {
            let source = copy.link(id).and_then(|l| l.match_id).unwrap_or(id);
            back.insert(id, source);
            if let Some(Some(link)) = copy.links.get_mut(id - 1) {
                link.required = required.contains(&source);
            }
        }
        Ok((copy, back))
    }
}
