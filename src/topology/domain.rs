//! Domain composition.
//!
//! Turns an abstract [`BaseGraph`] into one domain: every base node becomes a
//! switch, every base edge a switch-to-switch connection with allocated ports,
//! and end systems are attached to randomly chosen switches that are still
//! under the per-switch attachment threshold.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use super::state::SynthesisState;
use super::synthesis::BaseGraph;
use super::types::{ConnectionClass, EndSystem, Switch, DEFAULT_SWITCH_PORTS};
use crate::error::{GenerationWarning, Result};

/// Default maximum number of end systems attached to one switch
pub const DEFAULT_MAX_END_SYSTEMS_PER_SWITCH: usize = 4;

/// An undirected connection with ports already allocated on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalLink {
    pub a: String,
    pub b: String,
    pub a_port: u8,
    pub b_port: u8,
    pub a_domain: usize,
    pub b_domain: usize,
    pub class: ConnectionClass,
}

/// Switches, end systems and classed connections of one domain
#[derive(Debug, Clone, Default)]
pub struct DomainGraph {
    pub domain: usize,
    pub switches: Vec<Switch>,
    pub end_systems: Vec<EndSystem>,
    pub links: Vec<LogicalLink>,
}

impl DomainGraph {
    /// Number of end systems attached to `switch_id`
    pub fn attached_end_systems(&self, switch_id: &str) -> usize {
        self.links
            .iter()
            .filter(|l| l.class == ConnectionClass::SwitchToEndSystem && l.a == switch_id)
            .count()
    }
}

/// Compose domain `domain` from `base`, attaching up to `end_system_count` end systems.
pub fn compose_domain<R: Rng + ?Sized>(
    domain: usize,
    base: &BaseGraph,
    end_system_count: usize,
    max_per_switch: usize,
    state: &mut SynthesisState,
    rng: &mut R,
) -> Result<DomainGraph> {
    let mut graph = DomainGraph {
        domain,
        ..Default::default()
    };

    for _ in 0..base.node_count() {
        let id = state.next_switch_id();
        state.ports.register_switch(&id, DEFAULT_SWITCH_PORTS);
        graph.switches.push(Switch {
            id,
            ports: DEFAULT_SWITCH_PORTS,
            domain,
        });
    }

    for &(u, v) in base.edges() {
        let source = graph.switches[u].id.clone();
        let dest = graph.switches[v].id.clone();
        let source_port = state.ports.allocate(&source, ConnectionClass::SwitchToSwitch)?;
        let dest_port = state.ports.allocate(&dest, ConnectionClass::SwitchToSwitch)?;
        graph.links.push(LogicalLink {
            a: source,
            b: dest,
            a_port: source_port,
            b_port: dest_port,
            a_domain: domain,
            b_domain: domain,
            class: ConnectionClass::SwitchToSwitch,
        });
    }

    attach_end_systems(&mut graph, end_system_count, max_per_switch, state, rng)?;

    info!(
        "Domain {}: {} switches, {} end systems, {} connections",
        domain,
        graph.switches.len(),
        graph.end_systems.len(),
        graph.links.len()
    );
    Ok(graph)
}

/// Distribute end systems across switches under the attachment threshold.
///
/// A switch is eligible while it is under the threshold and still has a free
/// port. Stops early with a warning when no switch is eligible.
fn attach_end_systems<R: Rng + ?Sized>(
    graph: &mut DomainGraph,
    end_system_count: usize,
    max_per_switch: usize,
    state: &mut SynthesisState,
    rng: &mut R,
) -> Result<()> {
    for placed in 0..end_system_count {
        let eligible: Vec<usize> = graph
            .switches
            .iter()
            .enumerate()
            .filter(|(_, s)| graph.attached_end_systems(&s.id) < max_per_switch)
            .filter(|(_, s)| state.ports.free_ports(&s.id) > 0)
            .map(|(i, _)| i)
            .collect();
        let Some(&selected) = eligible.choose(rng) else {
            state.warn(GenerationWarning::EndSystemShortfall {
                domain: graph.domain,
                placed,
                requested: end_system_count,
            });
            break;
        };

        let switch_id = graph.switches[selected].id.clone();
        let end_system_id = state.next_end_system_id();
        let port = state.ports.allocate(&switch_id, ConnectionClass::SwitchToEndSystem)?;
        debug!("Attached {} to {} on port {}", end_system_id, switch_id, port);

        graph.end_systems.push(EndSystem {
            id: end_system_id.clone(),
            domain: graph.domain,
        });
        graph.links.push(LogicalLink {
            a: switch_id,
            b: end_system_id,
            a_port: port,
            b_port: 0,
            a_domain: graph.domain,
            b_domain: graph.domain,
            class: ConnectionClass::SwitchToEndSystem,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::topology::synthesis::TopologyStrategy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mesh_2x2() -> BaseGraph {
        TopologyStrategy::Mesh { n: 2, m: 2 }
            .synthesize(4, &mut StdRng::seed_from_u64(0))
            .unwrap()
    }

    #[test]
    fn test_structure_and_distribution() {
        let mut state = SynthesisState::new();
        let mut rng = StdRng::seed_from_u64(42);
        let graph = compose_domain(0, &mesh_2x2(), 8, 4, &mut state, &mut rng).unwrap();

        assert_eq!(graph.switches.len(), 4);
        assert_eq!(graph.end_systems.len(), 8);
        let core = graph
            .links
            .iter()
            .filter(|l| l.class == ConnectionClass::SwitchToSwitch)
            .count();
        assert_eq!(core, 4);
        for switch in &graph.switches {
            assert!(graph.attached_end_systems(&switch.id) <= 4);
        }
        // end systems always sit on port 0 of their own side
        assert!(graph
            .links
            .iter()
            .filter(|l| l.class == ConnectionClass::SwitchToEndSystem)
            .all(|l| l.b_port == 0 && l.b.starts_with("ES")));
    }

    #[test]
    fn test_core_links_use_core_pool() {
        let mut state = SynthesisState::new();
        let mut rng = StdRng::seed_from_u64(1);
        let graph = compose_domain(0, &mesh_2x2(), 0, 4, &mut state, &mut rng).unwrap();
        for link in &graph.links {
            assert!((2..=5).contains(&link.a_port));
            assert!((2..=5).contains(&link.b_port));
        }
    }

    #[test]
    fn test_shortfall_stops_softly() {
        let mut state = SynthesisState::new();
        let mut rng = StdRng::seed_from_u64(3);
        let graph = compose_domain(2, &mesh_2x2(), 10, 2, &mut state, &mut rng).unwrap();
        assert_eq!(graph.end_systems.len(), 8);

        let warnings = state.into_warnings();
        assert!(warnings.contains(&GenerationWarning::EndSystemShortfall {
            domain: 2,
            placed: 8,
            requested: 10
        }));
    }

    #[test]
    fn test_full_hub_is_skipped_for_end_systems() {
        // every port of the centre goes to its eight leaves
        let mut base = BaseGraph::new(9);
        for leaf in 1..9 {
            base.add_edge(0, leaf);
        }
        for seed in 0..8 {
            let mut state = SynthesisState::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let graph = compose_domain(0, &base, 4, 4, &mut state, &mut rng).unwrap();
            assert_eq!(graph.end_systems.len(), 4);
            assert_eq!(graph.attached_end_systems("SW0"), 0);
        }
    }

    #[test]
    fn test_no_free_port_anywhere_is_a_shortfall() {
        let mut base = BaseGraph::new(9);
        for leaf in 1..9 {
            base.add_edge(0, leaf);
        }
        let mut state = SynthesisState::new();
        let mut rng = StdRng::seed_from_u64(0);
        // leaves have seven free ports each, the hub none
        let graph = compose_domain(0, &base, 100, 100, &mut state, &mut rng).unwrap();
        assert_eq!(graph.end_systems.len(), 56);
        assert!(state.into_warnings().contains(&GenerationWarning::EndSystemShortfall {
            domain: 0,
            placed: 56,
            requested: 100
        }));
    }

    #[test]
    fn test_port_exhaustion_propagates() {
        // a star centre fits eight neighbours, the ninth exhausts it
        let mut base = BaseGraph::new(9);
        for leaf in 1..9 {
            base.add_edge(0, leaf);
        }
        let mut state = SynthesisState::new();
        let mut rng = StdRng::seed_from_u64(0);
        let result = compose_domain(0, &base, 0, 4, &mut state, &mut rng);
        assert!(result.is_ok());

        let mut base = BaseGraph::new(10);
        for leaf in 1..10 {
            base.add_edge(0, leaf);
        }
        let mut state = SynthesisState::new();
        let err = compose_domain(0, &base, 0, 4, &mut state, &mut rng).unwrap_err();
        assert!(matches!(err, GenerationError::PortExhaustion { .. }));
    }
}
