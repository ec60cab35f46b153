//! Arc routing problem instances.

use std::collections::BTreeMap;

use super::{Violation, ViolationType};
use crate::graph::{Graph, LinkId, ZigZagStatus};
use crate::objective::Objective;
use crate::route::Route;

/// A graph to serve, the objective to minimise and the fleet limits.
///
/// A problem without a graph is valid to build; solvers answer it with
/// `Ok(None)`.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::ShortestPaths;
/// use u_arc_routing::graph::{Graph, GraphKind};
/// use u_arc_routing::models::ArcRoutingProblem;
/// use u_arc_routing::objective::Objective;
/// use u_arc_routing::route::{CompactRoute, RouteExpander, RouteKind};
///
/// let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
/// g.add_edge(1, 2, 1, true).unwrap();
/// g.add_edge(2, 3, 1, true).unwrap();
/// let sp = ShortestPaths::compute(&g);
/// let tour = RouteExpander::new(&g, &sp)
///     .unflatten(&CompactRoute::forward_only(vec![1, 2]), RouteKind::Tour)
///     .unwrap();
///
/// let problem = ArcRoutingProblem::new()
///     .with_graph(g)
///     .with_objective(Objective::Sum)
///     .with_fleet_size(1);
/// assert!(problem.is_feasible(&[tour]));
/// ```
#[derive(Debug, Clone)]
pub struct ArcRoutingProblem {
    graph: Option<Graph>,
    objective: Objective,
    fleet_size: usize,
    capacity: Option<i64>,
}

impl ArcRoutingProblem {
    /// A single-vehicle min-max problem with no graph yet.
    pub fn new() -> Self {
        Self {
            graph: None,
            objective: Objective::default(),
            fleet_size: 1,
            capacity: None,
        }
    }

    /// Sets the graph to serve.
    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Sets the objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Sets the number of vehicles.
    pub fn with_fleet_size(mut self, fleet_size: usize) -> Self {
        self.fleet_size = fleet_size;
        self
    }

    /// Sets the per-vehicle capacity.
    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// The graph, if assigned.
    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    /// Replaces the graph.
    pub fn set_graph(&mut self, graph: Graph) {
        self.graph = Some(graph);
    }

    /// The objective.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Number of vehicles.
    pub fn fleet_size(&self) -> usize {
        self.fleet_size
    }

    /// Per-vehicle capacity, if bounded.
    pub fn capacity(&self) -> Option<i64> {
        self.capacity
    }

    /// Every reason `routes` is not an acceptable answer.
    pub fn violations(&self, routes: &[Route]) -> Vec<Violation> {
        let Some(graph) = &self.graph else {
            return vec![ViolationType::MissingGraph.into()];
        };
        let mut out = Vec::new();

        if routes.len() > self.fleet_size {
            out.push(
                ViolationType::FleetExceeded {
                    routes: routes.len(),
                    fleet: self.fleet_size,
                }
                .into(),
            );
        }

        let mut serviced: BTreeMap<LinkId, usize> = BTreeMap::new();
        for (route_index, route) in routes.iter().enumerate() {
            if let Err(e) = route.check(graph) {
                out.push(
                    ViolationType::MalformedRoute {
                        route_index,
                        reason: e.to_string(),
                    }
                    .into(),
                );
            }
            if !route.is_closed() || route.depot() != Some(graph.depot()) {
                out.push(ViolationType::OpenRoute { route_index }.into());
            }
            if let Some(capacity) = self.capacity {
                let load = route.demand(graph);
                if load > capacity {
                    out.push(
                        ViolationType::CapacityExceeded {
                            route_index,
                            load,
                            capacity,
                        }
                        .into(),
                    );
                }
            }
            for (link, _, zigzag) in route.compact().iter() {
                *serviced.entry(link).or_default() += 1;
                let mandatory = graph
                    .link(link)
                    .and_then(|l| l.zigzag())
                    .is_some_and(|z| z.status == ZigZagStatus::Mandatory);
                if mandatory && !zigzag {
                    out.push(ViolationType::MandatoryZigZagSkipped { route_index, link }.into());
                }
            }
        }

        for link in graph.required_links() {
            if !serviced.contains_key(&link) {
                out.push(ViolationType::MissingService { link }.into());
            }
        }
        for (&link, &count) in &serviced {
            if count > 1 {
                out.push(ViolationType::DuplicateService { link, count }.into());
            }
        }

        let value = self.objective.evaluate(graph, routes);
        if !Objective::is_well_defined(value) {
            out.push(ViolationType::UndefinedObjective { value }.into());
        }
        out
    }

    /// `true` if [`violations`](Self::violations) is empty.
    pub fn is_feasible(&self, routes: &[Route]) -> bool {
        self.violations(routes).is_empty()
    }
}

impl Default for ArcRoutingProblem {
    fn default() -> Self {
        Self::new()
    }
}
