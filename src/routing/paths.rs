//! Primary and alternate path search.
//!
//! The primary path is the cheapest path under the base weights. Each further
//! search doubles, on a copy of the base weights, the weight of every edge of
//! every path found so far (once per path using it) and runs the search again.
//! A result equal to an accepted path means no further distinct path is
//! reachable this way, and the search stops.

use log::debug;

use super::graph::RoutingGraph;

/// Up to `count` distinct paths from `source` to `target`, primary first.
///
/// Returns an empty list when the nodes are not connected.
pub fn find_paths(
    graph: &RoutingGraph,
    source: usize,
    target: usize,
    count: usize,
    base_weights: &[f64],
) -> Vec<Vec<usize>> {
    let Some(primary) = graph.shortest_path(source, target, base_weights) else {
        return Vec::new();
    };
    let mut paths = vec![primary];

    while paths.len() < count {
        let mut weights = base_weights.to_vec();
        for path in &paths {
            for edge in graph.path_edges(path) {
                weights[edge] *= 2.0;
            }
        }

        match graph.shortest_path(source, target, &weights) {
            Some(candidate) if !paths.contains(&candidate) => {
                debug!(
                    "Alternate path {} from {} to {} has {} hops",
                    paths.len(),
                    graph.node_name(source),
                    graph.node_name(target),
                    candidate.len().saturating_sub(1)
                );
                paths.push(candidate);
            }
            _ => break,
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::{ConnectionClass, EndSystem, Link, Switch};
    use crate::topology::Topology;

    fn topology(switches: usize, pairs: &[(&str, &str)]) -> Topology {
        let mut topology = Topology::new("MICRO_SECOND", 1000);
        for i in 0..switches {
            topology.switches.push(Switch {
                id: format!("SW{}", i),
                ports: 8,
                domain: 0,
            });
        }
        for i in 0..2 {
            topology.end_systems.push(EndSystem {
                id: format!("ES{}", i),
                domain: 0,
            });
        }
        for (i, (a, b)) in pairs.iter().enumerate() {
            for (id, s, d) in [(2 * i, a, b), (2 * i + 1, b, a)] {
                topology.links.push(Link {
                    id: format!("Link{}", id),
                    source: s.to_string(),
                    destination: d.to_string(),
                    source_port: 2,
                    destination_port: 2,
                    domain: 0,
                    bandwidth_mbps: 1000,
                    delay: 1.0,
                    connection_type: ConnectionClass::SwitchToSwitch,
                });
            }
        }
        topology
    }

    fn names(graph: &RoutingGraph, path: &[usize]) -> Vec<String> {
        path.iter().map(|&n| graph.node_name(n).to_string()).collect()
    }

    #[test]
    fn test_two_disjoint_routes_are_found() {
        let topology = topology(
            4,
            &[("SW0", "SW1"), ("SW0", "SW2"), ("SW1", "SW3"), ("SW2", "SW3"), ("ES0", "SW0"), ("ES1", "SW3")],
        );
        let graph = RoutingGraph::from_topology(&topology);
        let weights = vec![1.0; graph.edge_count()];
        let es0 = graph.node_index("ES0").unwrap();
        let es1 = graph.node_index("ES1").unwrap();

        let paths = find_paths(&graph, es0, es1, 2, &weights);
        assert_eq!(paths.len(), 2);
        assert_eq!(names(&graph, &paths[0]), vec!["ES0", "SW0", "SW1", "SW3", "ES1"]);
        assert_eq!(names(&graph, &paths[1]), vec!["ES0", "SW0", "SW2", "SW3", "ES1"]);
    }

    #[test]
    fn test_single_route_yields_shortfall() {
        let topology = topology(2, &[("SW0", "SW1"), ("ES0", "SW0"), ("ES1", "SW1")]);
        let graph = RoutingGraph::from_topology(&topology);
        let weights = vec![1.0; graph.edge_count()];
        let es0 = graph.node_index("ES0").unwrap();
        let es1 = graph.node_index("ES1").unwrap();

        let paths = find_paths(&graph, es0, es1, 3, &weights);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_unreachable_returns_nothing() {
        let topology = topology(2, &[("ES0", "SW0"), ("ES1", "SW1")]);
        let graph = RoutingGraph::from_topology(&topology);
        let weights = vec![1.0; graph.edge_count()];
        let es0 = graph.node_index("ES0").unwrap();
        let es1 = graph.node_index("ES1").unwrap();
        assert!(find_paths(&graph, es0, es1, 1, &weights).is_empty());
    }

    #[test]
    fn test_tie_with_accepted_path_ends_search() {
        // in a full mesh the detour via SW1 only ties with the doubled direct route
        let topology = topology(
            4,
            &[
                ("SW0", "SW1"),
                ("SW0", "SW2"),
                ("SW0", "SW3"),
                ("SW1", "SW2"),
                ("SW1", "SW3"),
                ("SW2", "SW3"),
                ("ES0", "SW0"),
                ("ES1", "SW3"),
            ],
        );
        let graph = RoutingGraph::from_topology(&topology);
        let weights = vec![1.0; graph.edge_count()];
        let es0 = graph.node_index("ES0").unwrap();
        let es1 = graph.node_index("ES1").unwrap();
        let paths = find_paths(&graph, es0, es1, 4, &weights);
        assert_eq!(paths.len(), 1);
        assert_eq!(names(&graph, &paths[0]), vec!["ES0", "SW0", "SW3", "ES1"]);
    }
}
