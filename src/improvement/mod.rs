//! Local search and metaheuristics over route collections.
//!
//! Intra-route procedures work on one route's compact form:
//! - [`OrInterchange`] — Segment relocation (up to L links by up to M positions)
//! - [`Reversal`] — Optimal orientation of a fixed service order, O(m)
//! - [`TwoInterchange`] — Block inversion
//! - [`ChangeZigZagDecision`] — Zigzag elections on zigzag tours
//!
//! Inter-route procedures price candidate batches with the
//! [`MoveEngine`](crate::moves::MoveEngine):
//! - [`Change1to0`], [`Change2to0`] — Relocation out of the longest route
//! - [`Change1to1`] — Exchange with the longest route
//!
//! [`IntraRouteVnd`] and [`InterRouteVnd`] compose them, and
//! [`IteratedLocalSearch`] adds the [`TwoSwapPerturb`] and [`RouteRotator`]
//! perturbations on top.

mod exchange;
mod framework;
mod or_opt;
mod perturbation;
mod procedure;
mod relocate;
mod reversal;
mod strategy;
mod two_interchange;
mod vnd;
mod zigzag;

pub use exchange::Change1to1;
pub use framework::IteratedLocalSearch;
pub use or_opt::OrInterchange;
pub use perturbation::{RouteRotator, TwoSwapPerturb};
pub use procedure::{ImprovementProcedure, IntraRouteImprovementProcedure};
pub use relocate::{Change1to0, Change2to0};
pub use reversal::Reversal;
pub use strategy::{ImprovementConfig, ImprovementStrategy};
pub use two_interchange::TwoInterchange;
pub use vnd::{InterRouteVnd, IntraRouteVnd};
pub use zigzag::ChangeZigZagDecision;
