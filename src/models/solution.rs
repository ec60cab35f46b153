//! Feasibility violations.

use crate::graph::LinkId;

/// A type of constraint violation in a route collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// The problem has no graph to check against.
    MissingGraph,
    /// A required link is not serviced by any route.
    MissingService {
        /// The unserviced link.
        link: LinkId,
    },
    /// A link is serviced more than once across the collection.
    DuplicateService {
        /// The link.
        link: LinkId,
        /// How many times it is serviced.
        count: usize,
    },
    /// More routes than vehicles.
    FleetExceeded {
        /// Number of routes.
        routes: usize,
        /// Fleet size.
        fleet: usize,
    },
    /// Vehicle capacity exceeded.
    CapacityExceeded {
        /// Route index in the collection.
        route_index: usize,
        /// Serviced demand.
        load: i64,
        /// Vehicle capacity.
        capacity: i64,
    },
    /// A route is not a tour ending at the depot.
    OpenRoute {
        /// Route index.
        route_index: usize,
    },
    /// A route fails its structural re-check.
    MalformedRoute {
        /// Route index.
        route_index: usize,
        /// What the check reported.
        reason: String,
    },
    /// A link whose zigzag is mandatory is serviced without zigzagging.
    MandatoryZigZagSkipped {
        /// Route index.
        route_index: usize,
        /// The link.
        link: LinkId,
    },
    /// The objective cannot rank this collection.
    UndefinedObjective {
        /// The score the objective produced.
        value: f64,
    },
}

/// A constraint violation in a route collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

impl From<ViolationType> for Violation {
    fn from(kind: ViolationType) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_types() {
        let v = Violation::new(ViolationType::CapacityExceeded {
            route_index: 0,
            load: 250,
            capacity: 200,
        });
        assert_eq!(
            v.kind,
            ViolationType::CapacityExceeded {
                route_index: 0,
                load: 250,
                capacity: 200,
            }
        );
        let w: Violation = ViolationType::MissingGraph.into();
        assert_eq!(w.kind, ViolationType::MissingGraph);
    }
}
