//! Graph variants and their degree bookkeeping.

use serde::{Deserialize, Serialize};

use super::{DegreeChange, DegreeRecord, Link, LinkKind};

/// Variant-specific rules for admitting links and maintaining degrees.
///
/// The graph calls [`contribution`](Self::contribution) when a link is
/// added or removed and applies the returned changes to the endpoints in
/// order, so a self-loop touches the same record twice.
pub trait DegreeUpdatePolicy {
    /// Human-readable variant name.
    fn name(&self) -> &'static str;

    /// Whether links of this kind may be added.
    fn accepts(&self, kind: &LinkKind) -> bool;

    /// Degree record for a freshly added vertex.
    fn initial_degree(&self) -> DegreeRecord;

    /// Changes applied to the first and second endpoint for `link`.
    fn contribution(&self, link: &Link) -> (DegreeChange, DegreeChange) {
        if link.is_directed() {
            (
                DegreeChange {
                    out_degree: 1,
                    ..DegreeChange::default()
                },
                DegreeChange {
                    in_degree: 1,
                    ..DegreeChange::default()
                },
            )
        } else {
            let change = DegreeChange {
                degree: 1,
                ..DegreeChange::default()
            };
            (change, change)
        }
    }
}

/// The five graph variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphKind {
    /// Arcs only.
    Directed,
    /// Edges only.
    Undirected,
    /// Mixed edges, each directed or not.
    Mixed,
    /// Windy edges.
    Windy,
    /// Windy edges with zigzag service options.
    ZigZag,
}

impl DegreeUpdatePolicy for GraphKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Directed => "directed",
            Self::Undirected => "undirected",
            Self::Mixed => "mixed",
            Self::Windy => "windy",
            Self::ZigZag => "zigzag",
        }
    }

    fn accepts(&self, kind: &LinkKind) -> bool {
        matches!(
            (self, kind),
            (Self::Directed, LinkKind::Arc)
                | (Self::Undirected, LinkKind::Edge)
                | (Self::Mixed, LinkKind::MixedEdge { .. })
                | (Self::Windy, LinkKind::Windy { .. })
                | (Self::ZigZag, LinkKind::ZigZag(_))
        )
    }

    fn initial_degree(&self) -> DegreeRecord {
        match self {
            Self::Directed => DegreeRecord::Directed {
                in_degree: 0,
                out_degree: 0,
            },
            Self::Mixed => DegreeRecord::Mixed {
                degree: 0,
                in_degree: 0,
                out_degree: 0,
            },
            Self::Undirected | Self::Windy | Self::ZigZag => DegreeRecord::Undirected { degree: 0 },
        }
    }
}

impl GraphKind {
    /// `true` for variants whose links all carry a reverse cost.
    pub fn is_windy(&self) -> bool {
        matches!(self, Self::Windy | Self::ZigZag)
    }
}
