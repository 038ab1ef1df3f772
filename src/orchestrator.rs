//! Test-case orchestrator.
//!
//! This module coordinates the overall fixture generation process: for each
//! requested test case it derives a seed, generates the topology, routes the
//! supplied streams, runs the integrity checks and writes the JSON files into
//! `<output_directory>/<test_case_name>/`.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::routing::{RouteGenerator, RouteSet, RoutingConfig, StreamSet};
use crate::topology::{TopologyConfig, TopologyDocument, TopologyGenerator};
use crate::utils::validation::{validate_routes, validate_streams, validate_topology};

pub const TOPOLOGY_FILE: &str = "topology.json";
pub const STREAMS_FILE: &str = "streams.json";
pub const ROUTES_FILE: &str = "routes.json";

/// Outcome of one generated test case
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseSummary {
    pub name: String,
    pub directory: PathBuf,
    pub seed: u64,
    pub switches: usize,
    pub end_systems: usize,
    pub links: usize,
    /// Number of routed streams, `None` when routing was skipped
    pub routes: Option<usize>,
    pub warnings: usize,
    pub validation_errors: Vec<String>,
}

/// Generate every configured test case.
///
/// Case `i` uses seed `seed + i`, or a fresh random seed when `seed` is `None`.
/// Cases run in parallel; each one owns its RNG and generator state. The first
/// failing case aborts the whole batch.
pub fn generate_test_cases(
    config: &Config,
    streams: Option<&StreamSet>,
    seed: Option<u64>,
) -> Result<Vec<TestCaseSummary>> {
    let topology_config = config
        .topology_config()
        .wrap_err("Invalid topology configuration")?;
    let routing_config = config.routing_config();

    let output_dir = PathBuf::from(&config.general.output_directory);
    fs::create_dir_all(&output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let count = config.general.num_test_cases;
    let seeds: Vec<u64> = (0..count)
        .map(|i| match seed {
            Some(seed) => seed.wrapping_add(i as u64),
            None => rand::random(),
        })
        .collect();
    info!("Generating {} test case(s) in {}", count, output_dir.display());

    let results: Vec<Result<TestCaseSummary>> = seeds
        .par_iter()
        .enumerate()
        .map(|(index, &case_seed)| {
            generate_test_case(
                config,
                &topology_config,
                &routing_config,
                streams,
                &output_dir,
                index,
                case_seed,
            )
        })
        .collect();

    let summaries = results.into_iter().collect::<Result<Vec<_>>>()?;
    info!("Generated {} test case(s)", summaries.len());
    Ok(summaries)
}

fn generate_test_case(
    config: &Config,
    topology_config: &TopologyConfig,
    routing_config: &RoutingConfig,
    streams: Option<&StreamSet>,
    output_dir: &Path,
    index: usize,
    seed: u64,
) -> Result<TestCaseSummary> {
    let name = config.test_case_name(index);
    let directory = output_dir.join(&name);
    info!("Generating test case {} (seed {})", name, seed);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut generator = TopologyGenerator::new(topology_config.clone());
    let topology = generator
        .generate(&mut rng)
        .wrap_err_with(|| format!("Topology generation failed for {}", name))?;
    let mut warnings = generator.warnings().len();

    let routes: Option<RouteSet> = match streams {
        Some(streams) if config.general.generate_routes => {
            let mut router = RouteGenerator::new(&topology, routing_config)
                .wrap_err_with(|| format!("Route generation failed for {}", name))?;
            let routes = router
                .generate_route_set(streams, &mut rng)
                .wrap_err_with(|| format!("Route generation failed for {}", name))?;
            warnings += router.warnings().len();
            Some(routes)
        }
        None if config.general.generate_routes => {
            info!("No streams supplied for {}, skipping route generation", name);
            None
        }
        _ => None,
    };

    let mut validation_errors = validate_topology(&topology);
    if let Some(streams) = streams {
        validation_errors.extend(validate_streams(streams));
        if let Some(routes) = &routes {
            validation_errors.extend(validate_routes(routes, &topology, streams));
        }
    }
    for error in &validation_errors {
        warn!("{}: {}", name, error);
    }

    fs::create_dir_all(&directory)
        .wrap_err_with(|| format!("Failed to create test case directory '{}'", directory.display()))?;

    let summary = TestCaseSummary {
        name,
        directory: directory.clone(),
        seed,
        switches: topology.switches.len(),
        end_systems: topology.end_systems.len(),
        links: topology.links.len(),
        routes: routes.as_ref().map(|r| r.routes.len()),
        warnings,
        validation_errors,
    };

    write_json(&directory.join(TOPOLOGY_FILE), &TopologyDocument { topology })?;
    if let Some(streams) = streams {
        write_json(&directory.join(STREAMS_FILE), streams)?;
    }
    if let Some(routes) = &routes {
        write_json(&directory.join(ROUTES_FILE), routes)?;
    }

    info!(
        "Test case {}: {} switches, {} end systems, {} links, {} routes",
        summary.name,
        summary.switches,
        summary.end_systems,
        summary.links,
        summary.routes.map_or_else(|| "no".to_string(), |r| r.to_string())
    );
    Ok(summary)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("Failed to create '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .wrap_err_with(|| format!("Failed to write '{}'", path.display()))?;
    Ok(())
}
