//! Switch-interconnection graph synthesis.
//!
//! A [`TopologyStrategy`] is a typed description of one generation strategy
//! (grid, binomial, industrial rings, random geometric, balanced tree). It is
//! resolved once from the configured strategy name and parameter map, then
//! [`TopologyStrategy::synthesize`] builds an abstract undirected graph over
//! `switch_count` nodes numbered `0..switch_count`.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GenerationError, Result};

/// Abstract undirected graph produced by a strategy, before switches exist.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseGraph {
    node_count: usize,
    edges: Vec<(usize, usize)>,
    seen: BTreeSet<(usize, usize)>,
}

impl BaseGraph {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            ..Default::default()
        }
    }

    /// Add an undirected edge. Self loops and repeated edges are ignored.
    pub fn add_edge(&mut self, a: usize, b: usize) {
        if a == b || a >= self.node_count || b >= self.node_count {
            return;
        }
        let key = (a.min(b), a.max(b));
        if self.seen.insert(key) {
            self.edges.push((a, b));
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.seen.contains(&(a.min(b), a.max(b)))
    }
}

/// Strategy kinds known to the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Mesh,
    Binomial,
    IndustrialRing,
    RandomGeometric,
    Tree,
}

/// Accepted configuration names for each strategy kind.
const STRATEGY_REGISTRY: &[(StrategyKind, &[&str])] = &[
    (StrategyKind::Mesh, &["mesh", "mesh_graph"]),
    (StrategyKind::Binomial, &["binomial", "binomial_graph"]),
    (
        StrategyKind::IndustrialRing,
        &["industrial-ring", "industrial_ring", "industrial_ring_graph"],
    ),
    (
        StrategyKind::RandomGeometric,
        &["random-geometric", "random_geometric", "random_geometric_graph"],
    ),
    (StrategyKind::Tree, &["tree", "tree_graph"]),
];

impl StrategyKind {
    /// Look up a strategy by configured name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        STRATEGY_REGISTRY
            .iter()
            .find(|(_, names)| names.iter().any(|n| n.eq_ignore_ascii_case(name)))
            .map(|(kind, _)| *kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::Binomial => "binomial",
            Self::IndustrialRing => "industrial-ring",
            Self::RandomGeometric => "random-geometric",
            Self::Tree => "tree",
        }
    }
}

/// A generation strategy together with its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyStrategy {
    /// Regular `n x m` grid
    Mesh { n: usize, m: usize },
    /// Each edge present independently with probability `p`
    Binomial { p: f64 },
    /// `num_rings` rings chained by one random inter-ring edge each
    IndustrialRing { num_rings: usize },
    /// Random positions in the unit square (or cube), edges within `radius`
    RandomGeometric { radius: f64, dim: usize },
    /// Balanced tree with `branching` children per node and `height` levels below the root
    Tree { branching: usize, height: usize },
}

impl TopologyStrategy {
    /// Resolve a configured strategy name and parameter map.
    ///
    /// Unknown names fall back to `mesh` with a warning; missing or malformed
    /// parameters are configuration errors.
    pub fn from_config(name: &str, params: &BTreeMap<String, f64>) -> Result<Self> {
        let kind = StrategyKind::from_name(name).unwrap_or_else(|| {
            warn!("Unknown topology type: {}. Defaulting to mesh graph.", name);
            StrategyKind::Mesh
        });
        Self::from_parameters(kind, params)
    }

    pub fn from_parameters(kind: StrategyKind, params: &BTreeMap<String, f64>) -> Result<Self> {
        let strategy = kind.name();
        match kind {
            StrategyKind::Mesh => Ok(Self::Mesh {
                n: require_count(strategy, params, &["n"])?,
                m: require_count(strategy, params, &["m"])?,
            }),
            StrategyKind::Binomial => {
                let p = require_number(strategy, params, &["p"])?;
                if !(0.0..=1.0).contains(&p) {
                    return Err(invalid(strategy, "p", "probability must lie within [0, 1]"));
                }
                Ok(Self::Binomial { p })
            }
            StrategyKind::IndustrialRing => {
                let num_rings =
                    require_count(strategy, params, &["num_rings", "numRings", "cwsg_num_rings"])?;
                if num_rings == 0 {
                    return Err(invalid(strategy, "num_rings", "at least one ring is required"));
                }
                Ok(Self::IndustrialRing { num_rings })
            }
            StrategyKind::RandomGeometric => {
                let radius = require_number(strategy, params, &["r", "radius"])?;
                if radius < 0.0 {
                    return Err(invalid(strategy, "r", "radius must not be negative"));
                }
                let dim = match lookup(params, &["dim"]) {
                    Some(_) => require_count(strategy, params, &["dim"])?,
                    None => 2,
                };
                if !(2..=3).contains(&dim) {
                    return Err(invalid(strategy, "dim", "only 2 or 3 dimensions are supported"));
                }
                Ok(Self::RandomGeometric { radius, dim })
            }
            StrategyKind::Tree => Ok(Self::Tree {
                branching: require_count(strategy, params, &["r"])?,
                height: require_count(strategy, params, &["h"])?,
            }),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Mesh { .. } => StrategyKind::Mesh,
            Self::Binomial { .. } => StrategyKind::Binomial,
            Self::IndustrialRing { .. } => StrategyKind::IndustrialRing,
            Self::RandomGeometric { .. } => StrategyKind::RandomGeometric,
            Self::Tree { .. } => StrategyKind::Tree,
        }
    }

    /// Build the base graph over `switch_count` nodes.
    pub fn synthesize<R: Rng + ?Sized>(&self, switch_count: usize, rng: &mut R) -> Result<BaseGraph> {
        let graph = match self {
            Self::Mesh { n, m } => mesh(*n, *m, switch_count)?,
            Self::Binomial { p } => binomial(*p, switch_count, rng),
            Self::IndustrialRing { num_rings } => industrial_ring(*num_rings, switch_count, rng)?,
            Self::RandomGeometric { radius, dim } => {
                random_geometric(*radius, *dim, switch_count, rng)
            }
            Self::Tree { branching, height } => tree(*branching, *height, switch_count)?,
        };
        debug!(
            "Synthesized {} graph with {} nodes and {} edges",
            self.kind().name(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

fn lookup(params: &BTreeMap<String, f64>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| params.get(*k).copied())
}

fn invalid(strategy: &str, parameter: &str, reason: &str) -> GenerationError {
    GenerationError::InvalidParameter {
        strategy: strategy.to_string(),
        parameter: parameter.to_string(),
        reason: reason.to_string(),
    }
}

fn require_number(strategy: &str, params: &BTreeMap<String, f64>, keys: &[&str]) -> Result<f64> {
    let value = lookup(params, keys).ok_or_else(|| GenerationError::MissingParameter {
        strategy: strategy.to_string(),
        parameter: keys[0].to_string(),
    })?;
    if !value.is_finite() {
        return Err(invalid(strategy, keys[0], "value must be finite"));
    }
    Ok(value)
}

fn require_count(strategy: &str, params: &BTreeMap<String, f64>, keys: &[&str]) -> Result<usize> {
    let value = require_number(strategy, params, keys)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(invalid(strategy, keys[0], "value must be a non-negative integer"));
    }
    Ok(value as usize)
}

fn check_size(strategy: StrategyKind, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GenerationError::SizeMismatch {
            strategy: strategy.name().to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Regular 2-D grid; node `(i, j)` is numbered `i * m + j`.
fn mesh(n: usize, m: usize, switch_count: usize) -> Result<BaseGraph> {
    check_size(StrategyKind::Mesh, switch_count, n.saturating_mul(m))?;
    let mut graph = BaseGraph::new(switch_count);
    for i in 0..n {
        for j in 0..m {
            let node = i * m + j;
            if j + 1 < m {
                graph.add_edge(node, node + 1);
            }
            if i + 1 < n {
                graph.add_edge(node, node + m);
            }
        }
    }
    Ok(graph)
}

fn binomial<R: Rng + ?Sized>(p: f64, switch_count: usize, rng: &mut R) -> BaseGraph {
    let mut graph = BaseGraph::new(switch_count);
    for a in 0..switch_count {
        for b in (a + 1)..switch_count {
            if rng.gen_bool(p) {
                graph.add_edge(a, b);
            }
        }
    }
    graph
}

fn industrial_ring<R: Rng + ?Sized>(
    num_rings: usize,
    switch_count: usize,
    rng: &mut R,
) -> Result<BaseGraph> {
    let nodes_per_ring = (switch_count / num_rings).max(3);
    check_size(
        StrategyKind::IndustrialRing,
        switch_count,
        nodes_per_ring.saturating_mul(num_rings),
    )?;

    let mut graph = BaseGraph::new(switch_count);
    for ring in 0..num_rings {
        let start = ring * nodes_per_ring;
        let end = start + nodes_per_ring - 1;
        for node in start..end {
            graph.add_edge(node, node + 1);
        }
        graph.add_edge(end, start);
    }

    for ring in 0..num_rings.saturating_sub(1) {
        let sources: Vec<usize> = (ring * nodes_per_ring..(ring + 1) * nodes_per_ring).collect();
        let targets: Vec<usize> =
            ((ring + 1) * nodes_per_ring..(ring + 2) * nodes_per_ring).collect();
        if let (Some(&a), Some(&b)) = (sources.choose(rng), targets.choose(rng)) {
            graph.add_edge(a, b);
        }
    }
    Ok(graph)
}

fn random_geometric<R: Rng + ?Sized>(
    radius: f64,
    dim: usize,
    switch_count: usize,
    rng: &mut R,
) -> BaseGraph {
    let positions: Vec<Vec<f64>> = (0..switch_count)
        .map(|_| (0..dim).map(|_| rng.gen::<f64>()).collect())
        .collect();

    let mut graph = BaseGraph::new(switch_count);
    for a in 0..switch_count {
        for b in (a + 1)..switch_count {
            let distance = positions[a]
                .iter()
                .zip(&positions[b])
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt();
            if distance <= radius {
                graph.add_edge(a, b);
            }
        }
    }
    graph
}

/// Balanced tree in breadth-first numbering: children of `k` are `k*r+1 ..= k*r+r`.
fn tree(branching: usize, height: usize, switch_count: usize) -> Result<BaseGraph> {
    let mut total: usize = 0;
    let mut level: usize = 1;
    for _ in 0..=height {
        total = total.saturating_add(level);
        level = level.saturating_mul(branching);
        // past the requested size, or no further levels can grow
        if total > switch_count || level == 0 {
            break;
        }
    }
    check_size(StrategyKind::Tree, switch_count, total)?;

    let mut graph = BaseGraph::new(switch_count);
    for parent in 0..switch_count {
        for c in 1..=branching {
            let child = parent * branching + c;
            if child >= switch_count {
                break;
            }
            graph.add_edge(parent, child);
        }
    }
    Ok(graph)
}
