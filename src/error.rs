//! Error type shared by every module of the crate.

use thiserror::Error;

use crate::graph::{LinkId, VertexId};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors raised by graph mutation, route construction, move application,
/// and the external oracle contracts.
///
/// Structural violations (bad endpoints, unknown ids, malformed routes) are
/// raised at the mutation site and never repaired. Infeasibility conditions
/// leave the receiver untouched so the caller may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// A link endpoint is not a member of the graph it is added to.
    #[error("invalid endpoints {first}-{second}: not members of this graph")]
    InvalidEndpoints {
        /// First (or tail) endpoint.
        first: VertexId,
        /// Second (or head) endpoint.
        second: VertexId,
    },
    /// A vertex id does not resolve in this graph.
    #[error("vertex {0} does not belong to this graph")]
    UnknownVertex(VertexId),
    /// A link id does not resolve in this graph.
    #[error("link {0} does not belong to this graph")]
    UnknownLink(LinkId),
    /// The graph variant does not accept this link type.
    #[error("a {graph} graph does not accept {link} links")]
    LinkTypeMismatch {
        /// Graph variant name.
        graph: &'static str,
        /// Link variant name.
        link: &'static str,
    },
    /// Consecutive links of a route do not share an endpoint, or a route
    /// fails its structural check.
    #[error("malformed route: {0}")]
    MalformedRoute(String),
    /// The first link of a tour does not touch the depot.
    #[error("link {link} is not incident to depot {depot}; the route cannot be anchored")]
    UnanchoredRoute {
        /// The link that was appended.
        link: LinkId,
        /// The depot the route is anchored to.
        depot: VertexId,
    },
    /// A zigzag service was requested or implied where it is not allowed.
    #[error("infeasible zigzag on link {link}: {reason}")]
    InfeasibleZigZag {
        /// The offending link.
        link: LinkId,
        /// Human-readable cause.
        reason: String,
    },
    /// Service was requested on a link that does not require it.
    #[error("link {0} is not required and cannot be serviced")]
    NotRequired(LinkId),
    /// A move position is outside the route once earlier moves are applied.
    #[error("move position {position} is out of range for route {route} (length {len})")]
    InvalidMovePosition {
        /// Route index in the solution.
        route: usize,
        /// Requested position.
        position: usize,
        /// Compact length at the time the move is replayed.
        len: usize,
    },
    /// A move refers to a route index outside the solution.
    #[error("route {0} is not part of this solution")]
    UnknownRoute(usize),
    /// The operation needs a closed tour but received another route kind.
    #[error("unsupported route: {0}")]
    UnsupportedRoute(String),
    /// A shortest-path query hit the unreachable sentinel.
    #[error("vertex {to} is unreachable from vertex {from}")]
    Disconnected {
        /// Source vertex.
        from: VertexId,
        /// Target vertex.
        to: VertexId,
    },
    /// No partition of the tasks fits the fleet.
    #[error("no split into {vehicles} routes respects capacity {capacity:?}")]
    InfeasibleSplit {
        /// Fleet size.
        vehicles: usize,
        /// Per-vehicle capacity.
        capacity: Option<i64>,
    },
    /// An Euler tour was requested on a graph that is not Eulerian.
    #[error("graph is not Eulerian: {0}")]
    NotEulerian(String),
    /// A matching or arborescence oracle rejected its input.
    #[error("oracle failure: {0}")]
    Oracle(String),
}
