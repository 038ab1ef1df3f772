//! Topology assembly.
//!
//! Drives one full topology run: a base graph and domain per configured
//! domain, inter-domain connections, then every logical connection emitted as
//! a pair of directed [`Link`]s with class-dependent bandwidth and delay.

use log::info;
use rand::Rng;

use super::domain::{compose_domain, DomainGraph, LogicalLink, DEFAULT_MAX_END_SYSTEMS_PER_SWITCH};
use super::interconnect::{connect_domain_pair, InterconnectStrategy};
use super::state::SynthesisState;
use super::synthesis::TopologyStrategy;
use super::types::{Link, Topology};
use crate::error::{GenerationWarning, Result};

/// Everything the assembler needs to produce one topology.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyConfig {
    pub num_domains: usize,
    pub strategy: TopologyStrategy,
    pub switches_per_domain: usize,
    pub end_systems_per_domain: usize,
    /// Attachment threshold per switch
    pub max_end_systems_per_switch: usize,
    pub interconnect: InterconnectStrategy,
    pub connections_per_pair: usize,
    pub default_bandwidth_mbps: u32,
    pub delay_units: String,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            num_domains: 1,
            strategy: TopologyStrategy::Mesh { n: 2, m: 2 },
            switches_per_domain: 4,
            end_systems_per_domain: 4,
            max_end_systems_per_switch: DEFAULT_MAX_END_SYSTEMS_PER_SWITCH,
            interconnect: InterconnectStrategy::Line,
            connections_per_pair: 1,
            default_bandwidth_mbps: 1000,
            delay_units: "MICRO_SECOND".to_string(),
        }
    }
}

/// Topology generator; one instance may run several times, each run starts from fresh state.
pub struct TopologyGenerator {
    config: TopologyConfig,
    warnings: Vec<GenerationWarning>,
}

impl TopologyGenerator {
    pub fn new(config: TopologyConfig) -> Self {
        Self {
            config,
            warnings: Vec::new(),
        }
    }

    /// Recoverable conditions recorded by the last run
    pub fn warnings(&self) -> &[GenerationWarning] {
        &self.warnings
    }

    /// Generate a complete topology. Any fatal condition aborts the run and no topology is returned.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Topology> {
        let config = &self.config;
        let mut state = SynthesisState::new();

        let mut domains = Vec::with_capacity(config.num_domains);
        for domain in 0..config.num_domains {
            let base = config.strategy.synthesize(config.switches_per_domain, rng)?;
            domains.push(compose_domain(
                domain,
                &base,
                config.end_systems_per_domain,
                config.max_end_systems_per_switch,
                &mut state,
                rng,
            )?);
        }

        let mut inter_domain = Vec::new();
        if domains.len() > 1 {
            for (a, b) in config.interconnect.domain_pairs(domains.len(), rng) {
                inter_domain.extend(connect_domain_pair(
                    &domains[a],
                    &domains[b],
                    config.connections_per_pair,
                    &mut state,
                    rng,
                )?);
            }
        }

        let topology = assemble(config, &domains, &inter_domain, &mut state, rng);
        info!(
            "Generated topology with {} nodes and {} links",
            topology.node_count(),
            topology.links.len()
        );
        self.warnings = state.into_warnings();
        Ok(topology)
    }
}

fn assemble<R: Rng + ?Sized>(
    config: &TopologyConfig,
    domains: &[DomainGraph],
    inter_domain: &[LogicalLink],
    state: &mut SynthesisState,
    rng: &mut R,
) -> Topology {
    let mut topology = Topology::new(&config.delay_units, config.default_bandwidth_mbps);
    for domain in domains {
        topology.switches.extend(domain.switches.iter().cloned());
        topology.end_systems.extend(domain.end_systems.iter().cloned());
    }

    let logical = domains.iter().flat_map(|d| d.links.iter()).chain(inter_domain);
    for link in logical {
        let (forward, reverse) = link_pair(link, state, rng);
        topology.links.push(forward);
        topology.links.push(reverse);
    }
    topology
}

/// Both directions of one connection; they share bandwidth and one sampled delay.
fn link_pair<R: Rng + ?Sized>(
    link: &LogicalLink,
    state: &mut SynthesisState,
    rng: &mut R,
) -> (Link, Link) {
    let (lo, hi) = link.class.delay_range();
    let delay = (rng.gen_range(lo..=hi) * 1000.0).round() / 1000.0;
    let bandwidth_mbps = link.class.bandwidth_mbps();

    let forward = Link {
        id: state.next_link_id(),
        source: link.a.clone(),
        destination: link.b.clone(),
        source_port: link.a_port,
        destination_port: link.b_port,
        domain: link.a_domain,
        bandwidth_mbps,
        delay,
        connection_type: link.class,
    };
    let reverse = Link {
        id: state.next_link_id(),
        source: link.b.clone(),
        destination: link.a.clone(),
        source_port: link.b_port,
        destination_port: link.a_port,
        domain: link.b_domain,
        bandwidth_mbps,
        delay,
        connection_type: link.class,
    };
    (forward, reverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::topology::types::ConnectionClass;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn generate(config: TopologyConfig, seed: u64) -> Result<Topology> {
        TopologyGenerator::new(config).generate(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_single_domain_mesh() {
        let topology = generate(TopologyConfig::default(), 1).unwrap();
        assert_eq!(topology.switches.len(), 4);
        assert_eq!(topology.end_systems.len(), 4);
        // 4 core connections and 4 access connections, two links each
        assert_eq!(topology.links.len(), 16);
        assert_eq!(topology.delay_units, "MICRO_SECOND");
    }

    #[test]
    fn test_links_come_in_swapped_pairs() {
        let topology = generate(TopologyConfig::default(), 2).unwrap();
        for pair in topology.links.chunks(2) {
            let (f, r) = (&pair[0], &pair[1]);
            assert_eq!(f.source, r.destination);
            assert_eq!(f.destination, r.source);
            assert_eq!(f.source_port, r.destination_port);
            assert_eq!(f.destination_port, r.source_port);
            assert_eq!(f.delay, r.delay);
            assert_eq!(f.bandwidth_mbps, r.bandwidth_mbps);
        }
    }

    #[test]
    fn test_class_properties_and_rounding() {
        let topology = generate(TopologyConfig::default(), 3).unwrap();
        for link in &topology.links {
            let (lo, hi) = link.connection_type.delay_range();
            assert!(link.delay >= lo && link.delay <= hi);
            assert_eq!(link.bandwidth_mbps, link.connection_type.bandwidth_mbps());
            assert!(((link.delay * 1000.0).round() - link.delay * 1000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_multi_domain_line() {
        let config = TopologyConfig {
            num_domains: 3,
            connections_per_pair: 2,
            ..Default::default()
        };
        let topology = generate(config, 4).unwrap();
        assert_eq!(topology.switches.len(), 12);
        assert_eq!(topology.switches[4].id, "SW4");
        assert_eq!(topology.switches[4].domain, 1);

        let inter: Vec<&Link> = topology
            .links
            .iter()
            .filter(|l| l.connection_type == ConnectionClass::DomainConnection)
            .collect();
        assert_eq!(inter.len(), 2 * 2 * 2);
        // inter-domain links follow all domain links
        let first_inter = topology
            .links
            .iter()
            .position(|l| l.connection_type == ConnectionClass::DomainConnection)
            .unwrap();
        assert!(topology.links[first_inter..]
            .iter()
            .all(|l| l.connection_type == ConnectionClass::DomainConnection));
    }

    #[test]
    fn test_ids_are_unique() {
        let config = TopologyConfig {
            num_domains: 2,
            ..Default::default()
        };
        let topology = generate(config, 5).unwrap();
        let ids: HashSet<&str> = topology.links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), topology.links.len());
        assert_eq!(topology.links[0].id, "Link0");
    }

    #[test]
    fn test_size_mismatch_produces_no_topology() {
        let config = TopologyConfig {
            strategy: TopologyStrategy::Mesh { n: 2, m: 3 },
            ..Default::default()
        };
        assert!(matches!(
            generate(config, 6),
            Err(GenerationError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_topology() {
        let config = TopologyConfig {
            num_domains: 3,
            strategy: TopologyStrategy::Binomial { p: 0.5 },
            switches_per_domain: 5,
            end_systems_per_domain: 6,
            interconnect: InterconnectStrategy::Random,
            ..Default::default()
        };
        assert_eq!(generate(config.clone(), 9).unwrap(), generate(config, 9).unwrap());
    }

    #[test]
    fn test_shortfall_is_reported() {
        let config = TopologyConfig {
            end_systems_per_domain: 20,
            ..Default::default()
        };
        let mut generator = TopologyGenerator::new(config);
        let topology = generator.generate(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(topology.end_systems.len(), 16);
        assert!(generator
            .warnings()
            .iter()
            .any(|w| matches!(w, GenerationWarning::EndSystemShortfall { placed: 16, .. })));
    }
}
