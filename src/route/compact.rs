//! Compact (serviced-only) route representation.

use crate::graph::{Graph, LinkId, VertexId};

/// The serviced links of a route in order, with parallel direction and
/// zigzag lists.
///
/// # Examples
///
/// ```
/// use u_arc_routing::route::CompactRoute;
///
/// let mut c = CompactRoute::new();
/// c.push(3, true, false);
/// c.insert(0, 7, false, false);
/// assert_eq!(c.links(), &[7, 3]);
/// assert_eq!(c.remove(1), (3, true, false));
/// assert_eq!(c.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactRoute {
    links: Vec<LinkId>,
    forward: Vec<bool>,
    zigzag: Vec<bool>,
}

impl CompactRoute {
    /// Creates an empty compact route.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from parallel lists.
    ///
    /// Returns `None` if the lengths differ.
    pub fn from_parts(links: Vec<LinkId>, forward: Vec<bool>, zigzag: Vec<bool>) -> Option<Self> {
        if links.len() != forward.len() || links.len() != zigzag.len() {
            return None;
        }
        Some(Self {
            links,
            forward,
            zigzag,
        })
    }

    /// Builds an all-forward, zigzag-free compact route.
    pub fn forward_only(links: Vec<LinkId>) -> Self {
        let n = links.len();
        Self {
            links,
            forward: vec![true; n],
            zigzag: vec![false; n],
        }
    }

    /// Serviced link ids.
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// Traversal direction of each serviced link.
    pub fn forward(&self) -> &[bool] {
        &self.forward
    }

    /// Zigzag election of each serviced link.
    pub fn zigzag(&self) -> &[bool] {
        &self.zigzag
    }

    /// Number of serviced links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// `true` if nothing is serviced.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Entry at `index` as `(link, forward, zigzag)`.
    pub fn get(&self, index: usize) -> Option<(LinkId, bool, bool)> {
        Some((
            *self.links.get(index)?,
            self.forward[index],
            self.zigzag[index],
        ))
    }

    /// Appends an entry.
    pub fn push(&mut self, link: LinkId, forward: bool, zigzag: bool) {
        self.links.push(link);
        self.forward.push(forward);
        self.zigzag.push(zigzag);
    }

    /// Inserts an entry before `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, link: LinkId, forward: bool, zigzag: bool) {
        self.links.insert(index, link);
        self.forward.insert(index, forward);
        self.zigzag.insert(index, zigzag);
    }

    /// Removes and returns the entry at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> (LinkId, bool, bool) {
        (
            self.links.remove(index),
            self.forward.remove(index),
            self.zigzag.remove(index),
        )
    }

    pub(crate) fn set_zigzag(&mut self, index: usize, zigzag: bool) {
        self.zigzag[index] = zigzag;
    }

    /// Reverses the slice `[i, j]` (inclusive) and flips its directions.
    pub fn reverse_segment(&mut self, i: usize, j: usize) {
        self.links[i..=j].reverse();
        self.forward[i..=j].reverse();
        self.zigzag[i..=j].reverse();
        for f in &mut self.forward[i..=j] {
            *f = !*f;
        }
    }

    /// Iterates `(link, forward, zigzag)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (LinkId, bool, bool)> + '_ {
        self.links
            .iter()
            .zip(&self.forward)
            .zip(&self.zigzag)
            .map(|((&l, &f), &z)| (l, f, z))
    }

    /// Vertex where entry `index` starts, if the link exists.
    pub fn start_vertex(&self, graph: &Graph, index: usize) -> Option<VertexId> {
        let (link, forward, _) = self.get(index)?;
        graph.link(link).map(|l| l.start(forward))
    }

    /// Vertex where entry `index` ends, if the link exists.
    pub fn end_vertex(&self, graph: &Graph, index: usize) -> Option<VertexId> {
        let (link, forward, _) = self.get(index)?;
        graph.link(link).map(|l| l.end(forward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_length_check() {
        assert!(CompactRoute::from_parts(vec![1, 2], vec![true], vec![false, false]).is_none());
        let c = CompactRoute::from_parts(vec![1], vec![false], vec![true]).unwrap();
        assert_eq!(c.get(0), Some((1, false, true)));
        assert_eq!(c.get(1), None);
    }

    #[test]
    fn test_reverse_segment_flips_directions() {
        let mut c = CompactRoute::forward_only(vec![1, 2, 3, 4]);
        c.reverse_segment(1, 2);
        assert_eq!(c.links(), &[1, 3, 2, 4]);
        assert_eq!(c.forward(), &[true, false, false, true]);
    }
}
