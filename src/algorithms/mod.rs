//! Graph algorithms used by the solvers.
//!
//! - Connectivity and Euler tours ([`is_connected`], [`euler_tour`])
//! - Odd-vertex restoration ([`parity_paths`])
//! - Oracle contracts with in-process implementations
//!   ([`MatchingOracle`] / [`ReferenceMatching`],
//!   [`ArborescenceOracle`] / [`ChuLiuEdmonds`])

mod arborescence;
mod connectivity;
mod euler;
mod matching;
mod tjoin;

pub use arborescence::{ArborescenceOracle, ChuLiuEdmonds};
pub use connectivity::{is_connected, is_strongly_connected, link_components};
pub use euler::{euler_tour, is_eulerian, Step};
pub use matching::{MatchingOracle, ReferenceMatching, EXACT_MATCHING_LIMIT};
pub use tjoin::{odd_vertices, parity_paths};
