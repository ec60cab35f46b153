//! Dense distance matrix.

/// Sentinel stored for unreachable pairs.
pub const UNREACHABLE: i64 = i64::MAX;

/// A dense n×n integer distance matrix stored in row-major order.
///
/// Unreachable pairs hold [`UNREACHABLE`]; [`get`](Self::get) reports them
/// as `None`.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::DistanceMatrix;
///
/// let mut dm = DistanceMatrix::new(3);
/// dm.set(0, 1, 5);
/// assert_eq!(dm.get(0, 1), Some(5));
/// assert_eq!(dm.get(1, 0), None);
/// assert_eq!(dm.get(2, 2), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    data: Vec<i64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a matrix with zero diagonal and every other pair unreachable.
    pub fn new(size: usize) -> Self {
        let mut data = vec![UNREACHABLE; size * size];
        for i in 0..size {
            data[i * size + i] = 0;
        }
        Self { data, size }
    }

    /// Distance from `from` to `to`, `None` if unreachable.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> Option<i64> {
        let d = self.raw(from, to);
        (d != UNREACHABLE).then_some(d)
    }

    /// Raw entry, possibly [`UNREACHABLE`].
    pub fn raw(&self, from: usize, to: usize) -> i64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from `from` to `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: i64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_disconnected() {
        let dm = DistanceMatrix::new(3);
        assert_eq!(dm.get(0, 0), Some(0));
        assert_eq!(dm.get(0, 2), None);
        assert_eq!(dm.raw(0, 2), UNREACHABLE);
    }

    #[test]
    fn test_set_overwrites_one_direction() {
        let mut dm = DistanceMatrix::new(2);
        dm.set(0, 1, 10);
        dm.set(1, 0, 15);
        dm.set(0, 1, 7);
        assert_eq!(dm.get(0, 1), Some(7));
        assert_eq!(dm.get(1, 0), Some(15));
        assert_eq!(dm.size(), 2);
    }
}
