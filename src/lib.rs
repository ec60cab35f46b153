//! # u-arc-routing
//!
//! Arc routing optimization library: Chinese and rural postman tours and
//! min-max K-vehicle routing over directed, undirected, mixed, windy and
//! zigzag graphs, with move-based local search and an iterated local search
//! on top.
//!
//! ## Modules
//!
//! - [`graph`] — Multi-variant graph model (vertices, links, degree policy)
//! - [`distance`] — All-pairs shortest-path oracle (Floyd–Warshall)
//! - [`algorithms`] — Connectivity, Euler tours, T-join, matching and arborescence oracles
//! - [`route`] — Flattened and compact route forms, re-expansion
//! - [`moves`] — Compact moves and the batch move engine
//! - [`constructive`] — Nearest-task giant tour and min-max split
//! - [`improvement`] — Intra/inter-route descents, VND, perturbations, ILS
//! - [`objective`] — Objective functions over route collections
//! - [`models`] — Problem instances and feasibility violations
//! - [`solver`] — Postman, rural postman and min-max K solvers
//!
//! ## Example
//!
//! ```
//! use u_arc_routing::graph::{Graph, GraphKind};
//! use u_arc_routing::models::ArcRoutingProblem;
//! use u_arc_routing::solver::{PostmanSolver, Solver};
//!
//! let mut g = Graph::with_vertices(GraphKind::Undirected, 3);
//! g.add_edge(1, 2, 2, true).unwrap();
//! g.add_edge(2, 3, 3, true).unwrap();
//! let problem = ArcRoutingProblem::new().with_graph(g);
//!
//! let routes = PostmanSolver::default().try_solve(&problem).unwrap().unwrap();
//! assert_eq!(routes[0].cost(), 10);
//! ```

pub mod algorithms;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod graph;
pub mod improvement;
pub mod models;
pub mod moves;
pub mod objective;
pub mod route;
pub mod solver;

pub use error::{Result, RoutingError};
