//! Route engine.
//!
//! Turns an assembled topology plus externally supplied streams into
//! port-annotated routes:
//!
//! - `graph`: undirected routing graph and weighted shortest paths
//! - `paths`: primary and alternate path search
//! - `delay`: end-to-end delay estimate per traffic type
//! - `generator`: per-stream pipeline and link-utilization accounting

pub mod delay;
pub mod generator;
pub mod graph;
pub mod paths;
pub mod types;

pub use generator::{RouteGenerator, RoutingAlgorithm, RoutingConfig};
pub use graph::RoutingGraph;
pub use types::{Destination, Hop, Route, RouteSet, StreamDescriptor, StreamSet, TrafficType};
