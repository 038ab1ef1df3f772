//! Network topology module.
//!
//! This module contains the multi-domain topology pipeline: base graph
//! synthesis, domain composition with port allocation, inter-domain
//! connection and final assembly into directed link pairs.

pub mod domain;
pub mod generator;
pub mod interconnect;
pub mod state;
pub mod synthesis;
pub mod types;

// Re-export key types and functions for easier access
pub use generator::{TopologyConfig, TopologyGenerator};
pub use interconnect::InterconnectStrategy;
pub use synthesis::{BaseGraph, StrategyKind, TopologyStrategy};
pub use types::{ConnectionClass, EndSystem, Link, Switch, Topology, TopologyDocument};
