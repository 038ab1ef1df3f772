//! Topology record types.
//!
//! These structures are what the assembler emits and what the route engine
//! consumes. Field names serialize to the legacy `topology.json` layout
//! (`switches`, `end_systems`, `links`, `sourcePort`, ...).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of ports on a synthesized switch
pub const DEFAULT_SWITCH_PORTS: u8 = 8;

/// Role of a connection, determining its bandwidth, delay range and port pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionClass {
    /// Core/distribution link between two switches of one domain
    SwitchToSwitch,
    /// Access link from a switch to an end system
    SwitchToEndSystem,
    /// Link between switches of two different domains
    DomainConnection,
}

impl ConnectionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwitchToSwitch => "switch_to_switch",
            Self::SwitchToEndSystem => "switch_to_end_system",
            Self::DomainConnection => "domain_connection",
        }
    }

    /// Link bandwidth in Mbps for this class
    pub fn bandwidth_mbps(&self) -> u32 {
        match self {
            Self::DomainConnection => 10_000,
            Self::SwitchToSwitch => 1_000,
            Self::SwitchToEndSystem => 100,
        }
    }

    /// Inclusive range the propagation delay is sampled from, in delay units
    pub fn delay_range(&self) -> (f64, f64) {
        match self {
            Self::DomainConnection => (50.0, 100.0),
            Self::SwitchToSwitch => (10.0, 50.0),
            Self::SwitchToEndSystem => (1.0, 10.0),
        }
    }
}

impl std::fmt::Display for ConnectionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub id: String,
    /// Fixed port capacity
    pub ports: u8,
    pub domain: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndSystem {
    pub id: String,
    pub domain: usize,
}

/// One direction of a logical connection.
///
/// Every connection is emitted as two `Link`s with swapped endpoints and ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub source: String,
    pub destination: String,
    #[serde(rename = "sourcePort")]
    pub source_port: u8,
    #[serde(rename = "destinationPort")]
    pub destination_port: u8,
    pub domain: usize,
    pub bandwidth_mbps: u32,
    pub delay: f64,
    pub connection_type: ConnectionClass,
}

/// Complete generated network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub delay_units: String,
    pub default_bandwidth_mbps: u32,
    pub switches: Vec<Switch>,
    pub end_systems: Vec<EndSystem>,
    pub links: Vec<Link>,
}

impl Topology {
    pub fn new(delay_units: &str, default_bandwidth_mbps: u32) -> Self {
        Self {
            delay_units: delay_units.to_string(),
            default_bandwidth_mbps,
            switches: Vec::new(),
            end_systems: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn switch(&self, id: &str) -> Option<&Switch> {
        self.switches.iter().find(|s| s.id == id)
    }

    pub fn is_end_system(&self, id: &str) -> bool {
        self.end_systems.iter().any(|es| es.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.switch(id).is_some() || self.is_end_system(id)
    }

    /// Find the directed link `source -> destination`
    pub fn find_link(&self, source: &str, destination: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.source == source && l.destination == destination)
    }

    /// Index of directed links keyed by `(source, destination)`.
    ///
    /// When a pair is connected more than once the first link wins, matching
    /// [`Topology::find_link`].
    pub fn link_index(&self) -> HashMap<(&str, &str), &Link> {
        let mut index = HashMap::with_capacity(self.links.len());
        for link in &self.links {
            index
                .entry((link.source.as_str(), link.destination.as_str()))
                .or_insert(link);
        }
        index
    }

    pub fn node_count(&self) -> usize {
        self.switches.len() + self.end_systems.len()
    }
}

/// Wrapper matching the on-disk `{"topology": {...}}` layout.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopologyDocument {
    pub topology: Topology,
}
