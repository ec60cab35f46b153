//! Routes in flattened and compact form.
//!
//! A [`Route`] records every traversal with its direction and service flags
//! and keeps the serviced-only [`CompactRoute`] view, cost and incremental
//! costs in step. [`RouteExpander`] goes the other way, from compact form to
//! a full tour.

mod compact;
mod expander;
mod walk;

pub use compact::CompactRoute;
pub use expander::RouteExpander;
pub use walk::{Route, RouteKind, RouteState, Traversal};
