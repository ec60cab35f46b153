//! Constructive heuristics for initial arc routing solutions.
//!
//! - [`nearest_task`] / [`giant_tour`] — Greedy nearest-task ordering, O(t²)
//! - [`split_min_max`] — Min-max K split of a giant tour (Prins, 2004), O(K·t²)

mod nearest_task;
mod split;

pub use nearest_task::{giant_tour, nearest_task};
pub use split::{split_min_max, SplitResult};
