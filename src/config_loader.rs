use crate::config::Config;
use crate::routing::StreamSet;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::fs::File;
use std::path::Path;

/// Load, parse and validate a generation configuration (YAML or legacy JSON)
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    // Open the configuration file
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file {:?}", config_path))?;

    // Parse the YAML content
    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file {:?}", config_path))?;

    // Validate the configuration
    config.validate()?;

    info!(
        "Configuration: {} test case(s), {} domain(s), topology {}",
        config.general.num_test_cases, config.general.num_domains, config.network.topology_type
    );
    Ok(config)
}

/// Load the stream collaborator's `streams.json`
pub fn load_streams(streams_path: &Path) -> Result<StreamSet> {
    info!("Loading streams from: {:?}", streams_path);

    let file = File::open(streams_path)
        .wrap_err_with(|| format!("Failed to open streams file {:?}", streams_path))?;
    let streams: StreamSet = serde_json::from_reader(std::io::BufReader::new(file))
        .wrap_err_with(|| format!("Failed to parse streams file {:?}", streams_path))?;

    if streams.streams.is_empty() {
        warn!("Streams file {:?} contains no streams", streams_path);
    }
    info!("Loaded {} streams", streams.streams.len());
    Ok(streams)
}

/// CLI arguments that can override configuration file settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_directory: Option<String>,
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(output) = &overrides.output_directory {
        info!("Overriding output directory: {}", output);
        config.general.output_directory = output.clone();
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
