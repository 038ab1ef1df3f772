//! Undirected routing graph.
//!
//! Built once from a [`Topology`]: the two directed link records of every
//! connection collapse into a single edge that remembers the first record's
//! id and bandwidth. Nodes are indexed switches first, then end systems, in
//! topology order, which keeps every search deterministic.

use log::{info, warn};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::GenerationWarning;
use crate::topology::Topology;

/// One undirected connection
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingEdge {
    pub a: usize,
    pub b: usize,
    pub link_id: String,
    pub bandwidth_mbps: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    names: Vec<String>,
    end_system: Vec<bool>,
    index: HashMap<String, usize>,
    edges: Vec<RoutingEdge>,
    edge_lookup: HashMap<(usize, usize), usize>,
    /// `(neighbour, edge)` per node, in edge insertion order
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl RoutingGraph {
    pub fn from_topology(topology: &Topology) -> Self {
        let mut graph = Self::default();
        for switch in &topology.switches {
            graph.add_node(&switch.id, false);
        }
        for end_system in &topology.end_systems {
            graph.add_node(&end_system.id, true);
        }

        for link in &topology.links {
            let (Some(&a), Some(&b)) = (graph.index.get(&link.source), graph.index.get(&link.destination))
            else {
                warn!(
                    "Link {} references unknown node ({} -> {}), ignoring it",
                    link.id, link.source, link.destination
                );
                continue;
            };
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            if graph.edge_lookup.contains_key(&key) {
                continue;
            }
            let bandwidth_mbps = if link.bandwidth_mbps > 0 {
                link.bandwidth_mbps
            } else {
                topology.default_bandwidth_mbps
            };
            let edge = graph.edges.len();
            graph.edges.push(RoutingEdge {
                a,
                b,
                link_id: link.id.clone(),
                bandwidth_mbps,
            });
            graph.edge_lookup.insert(key, edge);
            graph.adjacency[a].push((b, edge));
            graph.adjacency[b].push((a, edge));
        }
        graph
    }

    fn add_node(&mut self, id: &str, end_system: bool) {
        if self.index.contains_key(id) {
            return;
        }
        self.index.insert(id.to_string(), self.names.len());
        self.names.push(id.to_string());
        self.end_system.push(end_system);
        self.adjacency.push(Vec::new());
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node_name(&self, node: usize) -> &str {
        &self.names[node]
    }

    pub fn is_end_system(&self, node: usize) -> bool {
        self.end_system[node]
    }

    pub fn edges(&self) -> &[RoutingEdge] {
        &self.edges
    }

    pub fn edge(&self, edge: usize) -> &RoutingEdge {
        &self.edges[edge]
    }

    /// Edge joining `a` and `b`, in either direction
    pub fn edge_between(&self, a: usize, b: usize) -> Option<usize> {
        self.edge_lookup.get(&(a.min(b), a.max(b))).copied()
    }

    /// Edge indices traversed by a node sequence
    pub fn path_edges(&self, path: &[usize]) -> Vec<usize> {
        path.windows(2)
            .filter_map(|pair| self.edge_between(pair[0], pair[1]))
            .collect()
    }

    /// Connected component id per node
    pub fn components(&self) -> Vec<usize> {
        let mut component = vec![usize::MAX; self.node_count()];
        let mut next = 0;
        for start in 0..self.node_count() {
            if component[start] != usize::MAX {
                continue;
            }
            component[start] = next;
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                for &(neighbour, _) in &self.adjacency[node] {
                    if component[neighbour] == usize::MAX {
                        component[neighbour] = next;
                        stack.push(neighbour);
                    }
                }
            }
            next += 1;
        }
        component
    }

    /// Every unordered end-system pair with no path between them, each logged.
    pub fn check_end_system_connectivity(&self) -> Vec<GenerationWarning> {
        let component = self.components();
        let end_systems: Vec<usize> = (0..self.node_count()).filter(|&n| self.end_system[n]).collect();

        let mut warnings = Vec::new();
        for (i, &a) in end_systems.iter().enumerate() {
            for &b in &end_systems[i + 1..] {
                if component[a] != component[b] {
                    warnings.push(GenerationWarning::DisconnectedEndSystems {
                        first: self.names[a].clone(),
                        second: self.names[b].clone(),
                    });
                }
            }
        }

        if warnings.is_empty() {
            info!("All end systems are connected - topology is fully routable");
        } else {
            warn!("Found {} disconnected end system pairs", warnings.len());
            for warning in &warnings {
                warn!("{}", warning);
            }
        }
        warnings
    }

    /// Dijkstra over per-edge `weights`; returns the node sequence `source ..= target`.
    ///
    /// A node's predecessor only changes on a strictly cheaper cost, so ties
    /// resolve to the first route discovered in adjacency order.
    pub fn shortest_path(&self, source: usize, target: usize, weights: &[f64]) -> Option<Vec<usize>> {
        let mut cost = vec![f64::INFINITY; self.node_count()];
        let mut previous: Vec<Option<usize>> = vec![None; self.node_count()];
        let mut heap = BinaryHeap::new();

        cost[source] = 0.0;
        heap.push(State { cost: 0.0, node: source });

        while let Some(State { cost: current, node }) = heap.pop() {
            if node == target {
                break;
            }
            if current > cost[node] {
                continue;
            }
            for &(neighbour, edge) in &self.adjacency[node] {
                let next = current + weights[edge];
                if next < cost[neighbour] {
                    cost[neighbour] = next;
                    previous[neighbour] = Some(node);
                    heap.push(State { cost: next, node: neighbour });
                }
            }
        }

        if !cost[target].is_finite() {
            return None;
        }
        let mut path = vec![target];
        let mut node = target;
        while let Some(prev) = previous[node] {
            path.push(prev);
            node = prev;
        }
        path.reverse();
        Some(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    cost: f64,
    node: usize,
}

impl Eq for State {}

// Min-heap on cost, then on node index
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
