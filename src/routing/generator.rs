//! Route generation.
//!
//! Streams are processed strictly in input order. Each one is validated,
//! routed (primary plus redundant paths per destination), materialized into
//! port-annotated hops, given a delay estimate and finally accounted into the
//! link-utilization table that later utilization-aware searches read.

use log::{debug, error, info, warn};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

use super::delay::DelayModel;
use super::graph::RoutingGraph;
use super::paths::find_paths;
use super::types::{Hop, Route, RouteSet, StreamDescriptor, StreamSet, TrafficType};
use crate::error::{GenerationError, GenerationWarning, Result};
use crate::topology::Topology;

/// Utilization percentage a link saturates at
pub const MAX_UTILIZATION: f64 = 100.0;

/// Supported path search algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingAlgorithm {
    #[default]
    ShortestPath,
}

impl RoutingAlgorithm {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim() {
            "shortest_path" | "shortest-path" => Ok(Self::ShortestPath),
            other => Err(GenerationError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ShortestPath => "shortest_path",
        }
    }
}

/// Routing options taken from the generation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    pub algorithm: String,
    pub consider_link_utilization: bool,
    pub traffic_types: Vec<TrafficType>,
    pub delay_units: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            algorithm: RoutingAlgorithm::ShortestPath.name().to_string(),
            consider_link_utilization: false,
            traffic_types: Vec::new(),
            delay_units: "MICRO_SECOND".to_string(),
        }
    }
}

pub struct RouteGenerator<'a> {
    graph: RoutingGraph,
    /// Source port per directed `(source, destination)` pair, first link wins
    source_ports: HashMap<(&'a str, &'a str), u8>,
    consider_link_utilization: bool,
    delay_model: DelayModel,
    delay_units: String,
    /// Percentage per graph edge
    utilization: Vec<f64>,
    touched: Vec<bool>,
    connectivity_warnings: usize,
    warnings: Vec<GenerationWarning>,
}

impl<'a> RouteGenerator<'a> {
    /// Build the routing graph for `topology`. Fails on an unsupported algorithm.
    pub fn new(topology: &'a Topology, config: &RoutingConfig) -> Result<Self> {
        let algorithm = RoutingAlgorithm::from_name(&config.algorithm).inspect_err(|e| error!("{}", e))?;

        let graph = RoutingGraph::from_topology(topology);
        let warnings = graph.check_end_system_connectivity();
        let source_ports = topology
            .link_index()
            .into_iter()
            .map(|(key, link)| (key, link.source_port))
            .collect();
        let edge_count = graph.edge_count();
        info!(
            "Routing with {} over {} nodes and {} edges (utilization-aware: {})",
            algorithm.name(),
            graph.node_count(),
            edge_count,
            config.consider_link_utilization
        );

        Ok(Self {
            graph,
            source_ports,
            consider_link_utilization: config.consider_link_utilization,
            delay_model: DelayModel::new(&config.traffic_types),
            delay_units: config.delay_units.clone(),
            utilization: vec![0.0; edge_count],
            touched: vec![false; edge_count],
            connectivity_warnings: warnings.len(),
            warnings,
        })
    }

    /// Connectivity findings plus everything recorded by the last `generate` call
    pub fn warnings(&self) -> &[GenerationWarning] {
        &self.warnings
    }

    /// Current utilization percentage per link id, for links that carry periodic traffic
    pub fn link_utilization(&self) -> BTreeMap<String, f64> {
        self.graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(edge, _)| self.touched[*edge])
            .map(|(edge, data)| (data.link_id.clone(), self.utilization[edge]))
            .collect()
    }

    /// Route every stream in order. Rejected streams are skipped with a warning;
    /// delay-bound problems abort the whole run.
    ///
    /// Each call starts from an empty utilization table.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        streams: &[StreamDescriptor],
        rng: &mut R,
    ) -> Result<Vec<Route>> {
        self.utilization.iter_mut().for_each(|u| *u = 0.0);
        self.touched.iter_mut().for_each(|t| *t = false);
        self.warnings.truncate(self.connectivity_warnings);

        let mut routes = Vec::with_capacity(streams.len());
        for stream in streams {
            if let Some(route) = self.route_stream(stream, rng)? {
                routes.push(route);
            }
        }
        info!("Generated routes for {} of {} streams", routes.len(), streams.len());
        Ok(routes)
    }

    /// [`RouteGenerator::generate`] wrapped into the `routes.json` layout
    pub fn generate_route_set<R: Rng + ?Sized>(
        &mut self,
        streams: &StreamSet,
        rng: &mut R,
    ) -> Result<RouteSet> {
        let routes = self.generate(&streams.streams, rng)?;
        Ok(RouteSet::new(&self.delay_units, routes))
    }

    fn record(&mut self, warning: GenerationWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn endpoint(&mut self, stream: &StreamDescriptor, id: &str) -> Option<usize> {
        let node = self.graph.node_index(id);
        if node.is_none() {
            self.record(GenerationWarning::MissingNode {
                stream: stream.id,
                node: id.to_string(),
            });
        }
        node
    }

    fn base_weights(&self) -> Vec<f64> {
        if self.consider_link_utilization {
            self.utilization.iter().map(|u| 1.0 + u).collect()
        } else {
            vec![1.0; self.graph.edge_count()]
        }
    }

    fn route_stream<R: Rng + ?Sized>(
        &mut self,
        stream: &StreamDescriptor,
        rng: &mut R,
    ) -> Result<Option<Route>> {
        if stream.destinations.is_empty() {
            self.record(GenerationWarning::NoDestinations { stream: stream.id });
            return Ok(None);
        }
        let Some(source) = self.endpoint(stream, &stream.source) else {
            return Ok(None);
        };
        let mut targets = Vec::with_capacity(stream.destinations.len());
        for destination in &stream.destinations {
            let Some(target) = self.endpoint(stream, &destination.id) else {
                return Ok(None);
            };
            targets.push(target);
        }

        let requested = stream.redundancy + 1;
        let weights = self.base_weights();
        let mut paths = Vec::with_capacity(targets.len() * requested);
        for &target in &targets {
            let found = find_paths(&self.graph, source, target, requested, &weights);
            if found.is_empty() {
                self.record(GenerationWarning::NoPath {
                    stream: stream.id,
                    from: stream.source.clone(),
                    to: self.graph.node_name(target).to_string(),
                });
                return Ok(None);
            }
            if found.len() < requested {
                self.record(GenerationWarning::PathShortfall {
                    stream: stream.id,
                    from: stream.source.clone(),
                    to: self.graph.node_name(target).to_string(),
                    found: found.len(),
                    requested,
                });
            }
            paths.extend(found);
        }

        // the first path always leads to the first destination
        let deadline = stream.destinations.first().and_then(|d| d.deadline);
        let hops = paths[0].len().saturating_sub(1);
        let min_e2e_delay = self
            .delay_model
            .estimate(&stream.traffic_type, hops, deadline, rng)?;

        let materialized = paths.iter().map(|path| self.materialize(stream.id, path)).collect();
        self.account_utilization(stream, &paths);

        debug!(
            "Stream {}: {} paths, min_e2e_delay {:.3}",
            stream.id,
            paths.len(),
            min_e2e_delay
        );
        Ok(Some(Route {
            flow_id: stream.id,
            paths: materialized,
            min_e2e_delay,
        }))
    }

    /// Node sequence to hops carrying the egress port of each link; the last hop is port 0.
    fn materialize(&mut self, stream: u64, path: &[usize]) -> Vec<Hop> {
        let mut hops = Vec::with_capacity(path.len());
        for (i, &node) in path.iter().enumerate() {
            let name = self.graph.node_name(node).to_string();
            let port = match path.get(i + 1) {
                Some(&next) => {
                    let next_name = self.graph.node_name(next).to_string();
                    match self.source_ports.get(&(name.as_str(), next_name.as_str())).copied() {
                        Some(_) if self.graph.is_end_system(node) => 0,
                        Some(port) => port,
                        None => {
                            self.record(GenerationWarning::MissingLink {
                                stream,
                                from: name.clone(),
                                to: next_name,
                            });
                            0
                        }
                    }
                }
                None => 0,
            };
            hops.push(Hop { node: name, port });
        }
        hops
    }

    fn account_utilization(&mut self, stream: &StreamDescriptor, paths: &[Vec<usize>]) {
        let Some(demand_bps) = stream.demand_bps() else {
            return;
        };
        for path in paths {
            for edge in self.graph.path_edges(path) {
                let link_bps = self.graph.edge(edge).bandwidth_mbps as f64 * 1e6;
                let share = demand_bps / link_bps * 100.0;
                self.utilization[edge] = (self.utilization[edge] + share).min(MAX_UTILIZATION);
                self.touched[edge] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::types::Destination;
    use crate::topology::types::{ConnectionClass, EndSystem, Link, Switch};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type Connection = (&'static str, &'static str, u8, u8, ConnectionClass, u32);

    fn build_topology(switches: &[&str], connections: &[Connection]) -> Topology {
        let mut topology = Topology::new("MICRO_SECOND", 1000);
        for id in switches {
            topology.switches.push(Switch {
                id: id.to_string(),
                ports: 8,
                domain: 0,
            });
        }
        for id in ["ES0", "ES1"] {
            topology.end_systems.push(EndSystem {
                id: id.to_string(),
                domain: 0,
            });
        }
        for (i, &(a, b, pa, pb, class, bw)) in connections.iter().enumerate() {
            for (id, s, d, sp, dp) in [(2 * i, a, b, pa, pb), (2 * i + 1, b, a, pb, pa)] {
                topology.links.push(Link {
                    id: format!("Link{}", id),
                    source: s.to_string(),
                    destination: d.to_string(),
                    source_port: sp,
                    destination_port: dp,
                    domain: 0,
                    bandwidth_mbps: bw,
                    delay: 5.0,
                    connection_type: class,
                });
            }
        }
        topology
    }

    fn two_switch_topology() -> Topology {
        build_topology(
            &["SW0", "SW1"],
            &[
                ("SW0", "SW1", 2, 2, ConnectionClass::SwitchToSwitch, 1000),
                ("SW0", "ES0", 6, 0, ConnectionClass::SwitchToEndSystem, 100),
                ("SW1", "ES1", 6, 0, ConnectionClass::SwitchToEndSystem, 100),
            ],
        )
    }

    /// SW0 reaches SW3 through either SW1 or SW2; ES0 hangs off SW0, ES1 off SW3
    fn square_topology() -> Topology {
        build_topology(
            &["SW0", "SW1", "SW2", "SW3"],
            &[
                ("SW0", "SW1", 2, 2, ConnectionClass::SwitchToSwitch, 1000),
                ("SW0", "SW2", 3, 2, ConnectionClass::SwitchToSwitch, 1000),
                ("SW1", "SW3", 3, 2, ConnectionClass::SwitchToSwitch, 1000),
                ("SW2", "SW3", 3, 3, ConnectionClass::SwitchToSwitch, 1000),
                ("SW0", "ES0", 6, 0, ConnectionClass::SwitchToEndSystem, 100),
                ("SW3", "ES1", 6, 0, ConnectionClass::SwitchToEndSystem, 100),
            ],
        )
    }

    fn config() -> RoutingConfig {
        RoutingConfig {
            traffic_types: vec![TrafficType {
                name: "ISOCHRONOUS".to_string(),
                min_delay: Some(100.0),
                max_delay: Some(2000.0),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_unsupported_algorithm() {
        let topology = two_switch_topology();
        let config = RoutingConfig {
            algorithm: "k_shortest".to_string(),
            ..Default::default()
        };
        assert_eq!(
            RouteGenerator::new(&topology, &config).err(),
            Some(GenerationError::UnsupportedAlgorithm("k_shortest".to_string()))
        );
        assert!(RoutingAlgorithm::from_name("shortest-path").is_ok());
    }

    #[test]
    fn test_path_ports_follow_links() {
        let topology = two_switch_topology();
        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let stream = StreamDescriptor::new(0, "ES0", &["ES1"], "BEST-EFFORT");
        let routes = generator.generate(&[stream], &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(routes.len(), 1);
        let hops: Vec<(&str, u8)> = routes[0].paths[0].iter().map(|h| (h.node.as_str(), h.port)).collect();
        assert_eq!(hops, vec![("ES0", 0), ("SW0", 2), ("SW1", 6), ("ES1", 0)]);
        assert_eq!(routes[0].min_e2e_delay, 0.0);
    }

    #[test]
    fn test_missing_node_rejects_stream() {
        let topology = two_switch_topology();
        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let streams = vec![
            StreamDescriptor::new(0, "ES0", &["ES1", "ES9"], "BEST-EFFORT"),
            StreamDescriptor::new(1, "ES1", &["ES0"], "BEST-EFFORT"),
        ];
        let routes = generator.generate(&streams, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].flow_id, 1);
        assert_eq!(
            generator.warnings(),
            &[GenerationWarning::MissingNode {
                stream: 0,
                node: "ES9".to_string()
            }]
        );
    }

    #[test]
    fn test_redundancy_shortfall_is_soft() {
        let topology = two_switch_topology();
        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let mut stream = StreamDescriptor::new(0, "ES0", &["ES1"], "BEST-EFFORT");
        stream.redundancy = 1;
        let routes = generator.generate(&[stream], &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(routes[0].paths.len(), 1);
        assert!(matches!(
            generator.warnings()[0],
            GenerationWarning::PathShortfall { found: 1, requested: 2, .. }
        ));
    }

    #[test]
    fn test_utilization_saturates() {
        let topology = two_switch_topology();
        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let mut stream = StreamDescriptor::new(0, "ES0", &["ES1"], "BEST-EFFORT");
        // 1500 bytes every 100 us = 120 Mbps, more than an access link carries
        stream.size = 1500;
        stream.period = Some(100.0);
        generator.generate(&[stream], &mut StdRng::seed_from_u64(0)).unwrap();

        let utilization = generator.link_utilization();
        assert_eq!(utilization.len(), 3);
        assert_eq!(utilization["Link2"], 100.0);
        assert_eq!(utilization["Link4"], 100.0);
        assert!((utilization["Link0"] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_utilization_aware_routing_avoids_loaded_link() {
        let topology = square_topology();
        let streams: Vec<StreamDescriptor> = (0..2)
            .map(|id| {
                let mut stream = StreamDescriptor::new(id, "ES0", &["ES1"], "BEST-EFFORT");
                // 120 Mbps, 12% of each core link it crosses
                stream.size = 1500;
                stream.period = Some(100.0);
                stream
            })
            .collect();
        let nodes = |route: &Route| -> Vec<String> {
            route.paths[0].iter().map(|hop| hop.node.clone()).collect()
        };
        let via_sw1 = vec!["ES0", "SW0", "SW1", "SW3", "ES1"];
        let via_sw2 = vec!["ES0", "SW0", "SW2", "SW3", "ES1"];

        let aware = RoutingConfig {
            consider_link_utilization: true,
            ..config()
        };
        let mut generator = RouteGenerator::new(&topology, &aware).unwrap();
        let routes = generator.generate(&streams, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(nodes(&routes[0]), via_sw1);
        assert_eq!(nodes(&routes[1]), via_sw2);

        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let routes = generator.generate(&streams, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(nodes(&routes[0]), via_sw1);
        assert_eq!(nodes(&routes[1]), via_sw1);
    }

    #[test]
    fn test_aperiodic_streams_do_not_load_links() {
        let topology = two_switch_topology();
        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let mut stream = StreamDescriptor::new(0, "ES0", &["ES1"], "BEST-EFFORT");
        stream.size = 1500;
        generator.generate(&[stream], &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(generator.link_utilization().is_empty());
    }

    #[test]
    fn test_delay_uses_first_destination_deadline() {
        let topology = two_switch_topology();
        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let mut stream = StreamDescriptor::new(0, "ES0", &["ES1"], "ISOCHRONOUS");
        stream.destinations = vec![Destination {
            id: "ES1".to_string(),
            deadline: Some(250.0),
        }];
        let routes = generator.generate(&[stream], &mut StdRng::seed_from_u64(1)).unwrap();
        // three hops of at least 100 each exceed the deadline
        assert_eq!(routes[0].min_e2e_delay, 250.0);
    }

    #[test]
    fn test_unknown_traffic_type_is_fatal() {
        let topology = two_switch_topology();
        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let stream = StreamDescriptor::new(0, "ES0", &["ES1"], "VIDEO");
        assert_eq!(
            generator.generate(&[stream], &mut StdRng::seed_from_u64(0)),
            Err(GenerationError::UnknownTrafficType("VIDEO".to_string()))
        );
    }

    #[test]
    fn test_repeated_generation_is_identical() {
        let topology = two_switch_topology();
        let mut generator = RouteGenerator::new(&topology, &config()).unwrap();
        let mut stream = StreamDescriptor::new(0, "ES0", &["ES1"], "ISOCHRONOUS");
        stream.size = 100;
        stream.period = Some(1000.0);
        let streams = vec![stream];
        let first = generator.generate(&streams, &mut StdRng::seed_from_u64(3)).unwrap();
        let second = generator.generate(&streams, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(first, second);
    }
}
