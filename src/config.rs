//! Generation configuration.
//!
//! Mirrors the `gen_config` layout: `general`, `network`, `routing`,
//! `domain_connections` and `traffic` sections plus a top-level
//! `delay_units`. Files are read with `serde_yaml`, so both YAML and legacy
//! JSON configurations load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::GenerationError;
use crate::routing::{RoutingAlgorithm, RoutingConfig, TrafficType};
use crate::topology::domain::DEFAULT_MAX_END_SYSTEMS_PER_SWITCH;
use crate::topology::{InterconnectStrategy, TopologyConfig, TopologyStrategy};

/// Complete generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_delay_units")]
    pub delay_units: String,
    pub general: GeneralConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub routing: RoutingSection,
    #[serde(default)]
    pub domain_connections: DomainConnections,
    #[serde(default)]
    pub traffic: TrafficConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let general = &self.general;
        if general.output_directory.trim().is_empty() {
            return Err(ValidationError::InvalidGeneral(
                "output_directory cannot be empty".to_string(),
            ));
        }
        if general.num_test_cases == 0 {
            return Err(ValidationError::InvalidGeneral(
                "num_test_cases must be at least 1".to_string(),
            ));
        }
        if general.num_domains == 0 {
            return Err(ValidationError::InvalidGeneral(
                "num_domains must be at least 1".to_string(),
            ));
        }
        if general.topology_size.num_switches == 0 {
            return Err(ValidationError::InvalidGeneral(
                "topology_size.num_switches must be at least 1".to_string(),
            ));
        }
        if let Some(bounds) = &general.topology_size.end_systems_per_switch {
            match bounds.as_slice() {
                [min, max] if min <= max && *max > 0 => {}
                _ => {
                    return Err(ValidationError::InvalidGeneral(format!(
                        "end_systems_per_switch must be [min, max] with 0 < max and min <= max, got {:?}",
                        bounds
                    )))
                }
            }
        }

        if self.network.topology_type.trim().is_empty() {
            return Err(ValidationError::InvalidNetwork(
                "topology_type cannot be empty".to_string(),
            ));
        }
        if self.network.default_bandwidth_mbps == 0 {
            return Err(ValidationError::InvalidNetwork(
                "default_bandwidth_mbps must be at least 1".to_string(),
            ));
        }
        self.network.parameters.to_map()?;
        if self.domain_connections.connections_per_domain_pair == 0 {
            return Err(ValidationError::InvalidNetwork(
                "connections_per_domain_pair must be at least 1".to_string(),
            ));
        }

        RoutingAlgorithm::from_name(&self.routing.algorithm)
            .map_err(|e| ValidationError::InvalidRouting(e.to_string()))?;

        let mut names = std::collections::HashSet::new();
        for traffic_type in &self.traffic.types {
            if traffic_type.name.trim().is_empty() {
                return Err(ValidationError::InvalidTraffic(
                    "traffic type name cannot be empty".to_string(),
                ));
            }
            if !names.insert(traffic_type.name.as_str()) {
                return Err(ValidationError::InvalidTraffic(format!(
                    "traffic type {} is defined more than once",
                    traffic_type.name
                )));
            }
            if let (Some(min), Some(max)) = (traffic_type.min_delay, traffic_type.max_delay) {
                // same bounds the per-hop delay sampler accepts
                if !min.is_finite() || !max.is_finite() || min < 0.0 || max <= 0.0 || min > max {
                    return Err(ValidationError::InvalidTraffic(format!(
                        "traffic type {}: need 0 <= min_delay ({}) <= max_delay ({}) and max_delay > 0",
                        traffic_type.name, min, max
                    )));
                }
            }
        }

        Ok(())
    }

    /// Attachment threshold per switch, the upper `end_systems_per_switch` bound
    pub fn max_end_systems_per_switch(&self) -> usize {
        self.general
            .topology_size
            .end_systems_per_switch
            .as_ref()
            .and_then(|bounds| bounds.get(1).copied())
            .unwrap_or(DEFAULT_MAX_END_SYSTEMS_PER_SWITCH)
    }

    /// Resolve the topology section into an assembler configuration
    pub fn topology_config(&self) -> Result<TopologyConfig, GenerationError> {
        let params = self.network.parameters.to_map().map_err(|e| {
            GenerationError::InvalidParameter {
                strategy: self.network.topology_type.clone(),
                parameter: "parameters".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(TopologyConfig {
            num_domains: self.general.num_domains,
            strategy: TopologyStrategy::from_config(&self.network.topology_type, &params)?,
            switches_per_domain: self.general.topology_size.num_switches,
            end_systems_per_domain: self.general.topology_size.num_end_systems,
            max_end_systems_per_switch: self.max_end_systems_per_switch(),
            interconnect: InterconnectStrategy::from_name(&self.domain_connections.connection_type),
            connections_per_pair: self.domain_connections.connections_per_domain_pair,
            default_bandwidth_mbps: self.network.default_bandwidth_mbps,
            delay_units: self.delay_units.clone(),
        })
    }

    pub fn routing_config(&self) -> RoutingConfig {
        RoutingConfig {
            algorithm: self.routing.algorithm.clone(),
            consider_link_utilization: self.routing.consider_link_utilization,
            traffic_types: self.traffic.types.clone(),
            delay_units: self.delay_units.clone(),
        }
    }

    /// Directory name of test case `index` (0-based); `{}` in the pattern becomes `index + 1`
    pub fn test_case_name(&self, index: usize) -> String {
        let pattern = &self.general.test_case_naming;
        if pattern.contains("{}") {
            pattern.replacen("{}", &(index + 1).to_string(), 1)
        } else {
            format!("{}{}", pattern, index + 1)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub output_directory: String,
    pub num_test_cases: usize,
    #[serde(default = "default_num_domains")]
    pub num_domains: usize,
    #[serde(default = "default_test_case_naming")]
    pub test_case_naming: String,
    pub topology_size: TopologySize,
    #[serde(default = "default_true")]
    pub generate_routes: bool,
}

/// Per-domain sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySize {
    pub num_switches: usize,
    #[serde(default)]
    pub num_end_systems: usize,
    /// `[min, max]` end systems per switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_systems_per_switch: Option<Vec<usize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub topology_type: String,
    #[serde(default)]
    pub parameters: TopologyParameters,
    #[serde(default = "default_bandwidth")]
    pub default_bandwidth_mbps: u32,
}

/// Strategy parameters, either a mapping or the legacy literal string `"{'n': 2, 'm': 2}"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopologyParameters {
    Map(BTreeMap<String, f64>),
    Literal(String),
}

impl Default for TopologyParameters {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

impl TopologyParameters {
    /// Numeric parameter map; the literal form is read as a YAML flow mapping
    pub fn to_map(&self) -> Result<BTreeMap<String, f64>, ValidationError> {
        match self {
            Self::Map(map) => Ok(map.clone()),
            Self::Literal(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Self::Literal(text) => serde_yaml::from_str(text).map_err(|e| {
                ValidationError::InvalidNetwork(format!(
                    "cannot parse topology parameters {:?}: {}",
                    text, e
                ))
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingSection {
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default)]
    pub consider_link_utilization: bool,
}

impl Default for RoutingSection {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            consider_link_utilization: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConnections {
    #[serde(rename = "type", default = "default_connection_type")]
    pub connection_type: String,
    #[serde(default = "default_connections_per_pair")]
    pub connections_per_domain_pair: usize,
}

impl Default for DomainConnections {
    fn default() -> Self {
        Self {
            connection_type: default_connection_type(),
            connections_per_domain_pair: default_connections_per_pair(),
        }
    }
}

/// Only the delay bounds of each traffic type matter here; other keys are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficConfig {
    #[serde(default)]
    pub types: Vec<TrafficType>,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid network configuration: {0}")]
    InvalidNetwork(String),
    #[error("Invalid routing configuration: {0}")]
    InvalidRouting(String),
    #[error("Invalid traffic configuration: {0}")]
    InvalidTraffic(String),
}

fn default_delay_units() -> String {
    "MICRO_SECOND".to_string()
}

fn default_num_domains() -> usize {
    1
}

fn default_test_case_naming() -> String {
    "test_case_{}".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bandwidth() -> u32 {
    1000
}

fn default_algorithm() -> String {
    RoutingAlgorithm::ShortestPath.name().to_string()
}

fn default_connection_type() -> String {
    "line".to_string()
}

fn default_connections_per_pair() -> usize {
    1
}
