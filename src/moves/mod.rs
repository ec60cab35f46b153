//! Move evaluation and application.
//!
//! A [`CompactMove`] relocates one serviced link; [`MoveEngine`] prices a
//! batch from the shortest-path snapshot without touching routes and
//! commits it by re-expanding every route it changed.

mod compact_move;
mod engine;

pub use compact_move::CompactMove;
pub use engine::MoveEngine;
