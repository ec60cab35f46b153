//! Distance matrices and the all-pairs shortest-path oracle.
//!
//! [`ShortestPaths`] is computed once per graph generation and passed by
//! reference to route expansion, the move engine and objectives.

mod matrix;
mod shortest_paths;

pub use matrix::{DistanceMatrix, UNREACHABLE};
pub use shortest_paths::ShortestPaths;
