//! Multi-variant graph model.
//!
//! A [`Graph`] is an arena of [`Vertex`] and [`Link`] values addressed by
//! integer ids. Variant rules (which link types are admitted and how they
//! change degree records) live in [`DegreeUpdatePolicy`], implemented by
//! [`GraphKind`].

mod link;
mod network;
mod policy;
mod vertex;

pub use link::{Link, LinkId, LinkKind, LinkSpec, TimeWindow, ZigZagAttributes, ZigZagStatus};
pub use network::Graph;
pub use policy::{DegreeUpdatePolicy, GraphKind};
pub use vertex::{DegreeChange, DegreeRecord, Vertex, VertexId};
