//! Problem model for arc routing.
//!
//! An [`ArcRoutingProblem`] ties a graph to an objective and fleet limits,
//! and reports why a route collection is infeasible as a list of
//! [`Violation`]s.

mod problem;
mod solution;

pub use problem::ArcRoutingProblem;
pub use solution::{Violation, ViolationType};
