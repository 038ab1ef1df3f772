//! Mutable state of one topology generation run.
//!
//! Identifier counters, the port-usage table and the recorded warnings live
//! here instead of in globals, so independent runs never share state.

use log::warn;

use crate::error::GenerationWarning;
use crate::ports::PortAllocator;

#[derive(Debug, Default)]
pub struct SynthesisState {
    pub ports: PortAllocator,
    switch_counter: usize,
    end_system_counter: usize,
    link_counter: usize,
    warnings: Vec<GenerationWarning>,
}

impl SynthesisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next switch identifier (`SW0`, `SW1`, ...)
    pub fn next_switch_id(&mut self) -> String {
        let id = format!("SW{}", self.switch_counter);
        self.switch_counter += 1;
        id
    }

    /// Next end system identifier (`ES0`, `ES1`, ...)
    pub fn next_end_system_id(&mut self) -> String {
        let id = format!("ES{}", self.end_system_counter);
        self.end_system_counter += 1;
        id
    }

    /// Next directed link identifier (`Link0`, `Link1`, ...)
    pub fn next_link_id(&mut self) -> String {
        let id = format!("Link{}", self.link_counter);
        self.link_counter += 1;
        id
    }

    /// Log and record a recoverable condition
    pub fn warn(&mut self, warning: GenerationWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// All warnings of the run, including degraded port allocations
    pub fn into_warnings(mut self) -> Vec<GenerationWarning> {
        let mut warnings = self.ports.take_warnings();
        warnings.append(&mut self.warnings);
        warnings
    }
}
