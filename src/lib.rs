//! # tsngen - Topology synthesis and routing for Time-Sensitive Network fixtures
//!
//! This library generates multi-domain switched Ethernet topologies and routes
//! application streams over them, producing the `topology.json` and
//! `routes.json` files consumed by TSN scheduling test suites.
//!
//! ## Overview
//!
//! A run starts from a generation configuration (`gen_config.yaml`, legacy JSON
//! also accepted). For every test case the engine:
//!
//! 1. Builds one base switch graph per domain from a named strategy
//!    (mesh grid, binomial random, industrial rings, random geometric, tree)
//! 2. Attaches end systems to switches, allocating physical ports
//! 3. Connects domains pairwise (line, square grid or random)
//! 4. Routes each stream with weighted shortest paths, optionally finding
//!    redundant paths, and estimates a minimum end-to-end delay
//!
//! ## Architecture
//!
//! - `config`: configuration structures and validation
//! - `config_loader`: configuration and stream file loading
//! - `error`: fatal errors and non-fatal warnings
//! - `ports`: per-switch port allocation
//! - `topology`: base graph strategies, domain composition and interconnection
//! - `routing`: routing graph, path search, delay model and route generation
//! - `utils`: fixture integrity validation
//! - `orchestrator`: per-test-case generation and file output
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use tsngen::routing::{RoutingConfig, StreamDescriptor};
//! use tsngen::topology::TopologyConfig;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let topology = tsngen::generate_topology(&TopologyConfig::default(), &mut rng)?;
//! let streams = vec![StreamDescriptor::new(0, "ES0", &["ES1"], "BEST-EFFORT")];
//! let routes = tsngen::generate_routes(&topology, &streams, &RoutingConfig::default(), &mut rng)?;
//! assert_eq!(routes.len(), 1);
//! # Ok::<(), tsngen::error::GenerationError>(())
//! ```
//!
//! ## Error Handling
//!
//! Generation functions return [`error::GenerationError`] for fatal problems
//! and collect [`error::GenerationWarning`]s for recoverable ones. The
//! loader and orchestrator wrap everything in `color_eyre` reports with context.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod routing;
pub mod topology;
pub mod utils;

use rand::Rng;

use error::Result;
use routing::{Route, RouteGenerator, RoutingConfig, StreamDescriptor};
use topology::{Topology, TopologyConfig, TopologyGenerator};

/// Generate one topology; warnings are logged and dropped
pub fn generate_topology<R: Rng + ?Sized>(config: &TopologyConfig, rng: &mut R) -> Result<Topology> {
    let mut generator = TopologyGenerator::new(config.clone());
    generator.generate(rng)
}

/// Route `streams` over `topology`; warnings are logged and dropped
pub fn generate_routes<R: Rng + ?Sized>(
    topology: &Topology,
    streams: &[StreamDescriptor],
    config: &RoutingConfig,
    rng: &mut R,
) -> Result<Vec<Route>> {
    let mut generator = RouteGenerator::new(topology, config)?;
    generator.generate(streams, rng)
}
