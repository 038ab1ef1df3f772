//! Per-switch port bookkeeping.
//!
//! The allocator owns the port-usage table for one generation run. It is
//! mutated strictly in call order, so the same sequence of requests always
//! yields the same port numbers.

use log::{debug, error, warn};
use std::collections::{BTreeSet, HashMap};

use super::pools::priority_ports;
use crate::error::{GenerationError, GenerationWarning, Result};
use crate::topology::types::ConnectionClass;

/// Port-usage table for all switches of a run
#[derive(Debug, Default)]
pub struct PortAllocator {
    /// Tracks used ports per switch
    used_ports: HashMap<String, BTreeSet<u8>>,
    /// Port capacity per switch
    capacities: HashMap<String, u8>,
    /// Allocations that fell outside their class pool
    warnings: Vec<GenerationWarning>,
}

impl PortAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a switch with the given number of ports
    pub fn register_switch(&mut self, switch_id: &str, capacity: u8) {
        self.capacities.insert(switch_id.to_string(), capacity);
        self.used_ports.entry(switch_id.to_string()).or_default();
    }

    /// Pick the next free port on `switch_id` for a connection of `class` and mark it used.
    ///
    /// Priority order:
    /// 1) First free port from the class pool
    /// 2) Any free port `0..capacity` (recorded as a degraded allocation)
    /// 3) Port exhaustion error
    pub fn allocate(&mut self, switch_id: &str, class: ConnectionClass) -> Result<u8> {
        let capacity = *self
            .capacities
            .get(switch_id)
            .ok_or_else(|| GenerationError::UnknownSwitch(switch_id.to_string()))?;
        let used = self.used_ports.entry(switch_id.to_string()).or_default();

        if let Some(&port) = priority_ports(class)
            .iter()
            .find(|&&p| p < capacity && !used.contains(&p))
        {
            used.insert(port);
            debug!("Switch {} assigned port {} for {} connection", switch_id, port, class);
            return Ok(port);
        }

        if let Some(port) = (0..capacity).find(|p| !used.contains(p)) {
            used.insert(port);
            let warning = GenerationWarning::PortOutsidePriority {
                switch: switch_id.to_string(),
                port,
                class: class.to_string(),
            };
            warn!("{}. This might affect network performance.", warning);
            self.warnings.push(warning);
            return Ok(port);
        }

        error!(
            "Switch {} has no more available ports (all {} ports are in use). \
             Reduce the number of connections, add switches, or choose a less dense topology.",
            switch_id, capacity
        );
        Err(GenerationError::PortExhaustion {
            switch: switch_id.to_string(),
            capacity,
        })
    }

    /// Number of free ports left on a switch
    pub fn free_ports(&self, switch_id: &str) -> usize {
        let capacity = self.capacities.get(switch_id).copied().unwrap_or(0) as usize;
        capacity.saturating_sub(self.used_ports.get(switch_id).map_or(0, |p| p.len()))
    }

    /// Drain the degraded-allocation warnings recorded so far
    pub fn take_warnings(&mut self) -> Vec<GenerationWarning> {
        std::mem::take(&mut self.warnings)
    }
}
