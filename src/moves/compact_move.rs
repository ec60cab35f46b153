//! Single-link relocation descriptor.

use log::warn;

use crate::route::Route;

/// Relocation of one serviced link between (or within) routes.
///
/// Positions refer to compact representations. `to_pos` is expressed in
/// the destination as it stands before the link is removed, so moving
/// forward inside one route with `from_pos < to_pos` lands at `to_pos - 1`
/// once the link is lifted out.
///
/// Batches may chain moves whose positions only make sense after the
/// earlier moves ran; the engine re-validates each step.
///
/// # Examples
///
/// ```
/// use u_arc_routing::moves::CompactMove;
///
/// let m = CompactMove::unchecked(0, 2, 1, 0);
/// assert_eq!((m.from(), m.from_pos(), m.to(), m.to_pos()), (0, 2, 1, 0));
/// assert_eq!(m.direction(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactMove {
    from: usize,
    from_pos: usize,
    to: usize,
    to_pos: usize,
    direction: Option<bool>,
}

impl CompactMove {
    /// Creates a move, warning if a position is out of range for `routes`
    /// as they currently stand.
    pub fn new(routes: &[Route], from: usize, from_pos: usize, to: usize, to_pos: usize) -> Self {
        match routes.get(from) {
            Some(r) if from_pos >= r.compact().len() => warn!(
                "move source position {} exceeds route {} of {} serviced links",
                from_pos,
                from,
                r.compact().len()
            ),
            None => warn!("move source route {} does not exist", from),
            _ => {}
        }
        match routes.get(to) {
            Some(r) if to_pos > r.compact().len() => warn!(
                "move destination position {} exceeds route {} of {} serviced links",
                to_pos,
                to,
                r.compact().len()
            ),
            None => warn!("move destination route {} does not exist", to),
            _ => {}
        }
        Self::unchecked(from, from_pos, to, to_pos)
    }

    /// Creates a move without looking at any route.
    pub fn unchecked(from: usize, from_pos: usize, to: usize, to_pos: usize) -> Self {
        Self {
            from,
            from_pos,
            to,
            to_pos,
            direction: None,
        }
    }

    /// Source route index.
    pub fn from(&self) -> usize {
        self.from
    }

    /// Position in the source compact representation.
    pub fn from_pos(&self) -> usize {
        self.from_pos
    }

    /// Destination route index.
    pub fn to(&self) -> usize {
        self.to
    }

    /// Position in the destination compact representation.
    pub fn to_pos(&self) -> usize {
        self.to_pos
    }

    /// Orientation chosen by the last evaluation (`true` = forward).
    pub fn direction(&self) -> Option<bool> {
        self.direction
    }

    /// Fixes the orientation used when the move is applied.
    pub fn with_direction(mut self, forward: bool) -> Self {
        self.direction = Some(forward);
        self
    }

    pub(crate) fn set_direction(&mut self, forward: bool) {
        self.direction = Some(forward);
    }

    /// Insertion index in the destination after the link was removed.
    pub(crate) fn insertion_index(&self) -> usize {
        if self.from == self.to && self.to_pos > self.from_pos {
            self.to_pos - 1
        } else {
            self.to_pos
        }
    }
}
