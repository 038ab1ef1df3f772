//! Inter-domain connection strategies.
//!
//! A strategy decides which domain pairs are connected; [`connect_domain_pair`]
//! then picks distinct switch pairs across the two domains and allocates
//! `domain_connection` ports for them.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use super::domain::{DomainGraph, LogicalLink};
use super::state::SynthesisState;
use super::types::ConnectionClass;
use crate::error::{GenerationWarning, Result};

/// How domains are wired together when there is more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterconnectStrategy {
    /// Domain `i` to `i + 1`
    #[default]
    Line,
    /// Domains laid out on a near-square grid, right and bottom neighbours connected
    Square,
    /// Random spanning tree plus extra random pairs
    Random,
}

impl InterconnectStrategy {
    /// Resolve a configured name; unknown names fall back to `line`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "line" => Self::Line,
            "square" | "grid" => Self::Square,
            "random" => Self::Random,
            other => {
                warn!("Unknown domain connection type: {}. Using line connection.", other);
                Self::Line
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Square => "square",
            Self::Random => "random",
        }
    }

    /// Ordered list of domain pairs to connect for `domain_count` domains.
    pub fn domain_pairs<R: Rng + ?Sized>(&self, domain_count: usize, rng: &mut R) -> Vec<(usize, usize)> {
        if domain_count < 2 {
            return Vec::new();
        }
        match self {
            Self::Line => (0..domain_count - 1).map(|i| (i, i + 1)).collect(),
            Self::Square => square_pairs(domain_count),
            Self::Random => random_pairs(domain_count, rng),
        }
    }
}

/// `rows = floor(sqrt(n))`, `cols = ceil(n / rows)`, domain `i` sits at `(i / cols, i % cols)`.
fn square_pairs(domain_count: usize) -> Vec<(usize, usize)> {
    let rows = ((domain_count as f64).sqrt() as usize).max(1);
    let cols = domain_count.div_ceil(rows);

    let mut pairs = Vec::new();
    for i in 0..domain_count {
        let (row, col) = (i / cols, i % cols);
        if col + 1 < cols && i + 1 < domain_count {
            pairs.push((i, i + 1));
        }
        if row + 1 < rows && i + cols < domain_count {
            pairs.push((i, i + cols));
        }
    }
    pairs
}

/// Random recursive spanning tree, then `n(n-1)/4 - (n-1)` extra pairs when that is positive.
fn random_pairs<R: Rng + ?Sized>(domain_count: usize, rng: &mut R) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..domain_count).collect();
    order.shuffle(rng);

    let mut pairs = Vec::with_capacity(domain_count - 1);
    for position in 1..order.len() {
        let parent = order[rng.gen_range(0..position)];
        let child = order[position];
        pairs.push((parent.min(child), parent.max(child)));
    }

    let extra = (domain_count * (domain_count - 1) / 4).saturating_sub(domain_count - 1);
    if extra > 0 {
        let candidates: Vec<(usize, usize)> = (0..domain_count)
            .flat_map(|a| ((a + 1)..domain_count).map(move |b| (a, b)))
            .filter(|pair| !pairs.contains(pair))
            .collect();
        let chosen: Vec<(usize, usize)> = candidates.choose_multiple(rng, extra).copied().collect();
        pairs.extend(chosen);
    }
    pairs
}

/// Connect up to `connections` distinct switch pairs between two domains.
///
/// Each switch is used at most once per call. A domain without switches is
/// skipped with a warning.
pub fn connect_domain_pair<R: Rng + ?Sized>(
    first: &DomainGraph,
    second: &DomainGraph,
    connections: usize,
    state: &mut SynthesisState,
    rng: &mut R,
) -> Result<Vec<LogicalLink>> {
    if first.switches.is_empty() || second.switches.is_empty() {
        state.warn(GenerationWarning::DomainWithoutSwitches {
            first: first.domain,
            second: second.domain,
        });
        return Ok(Vec::new());
    }

    let mut left: Vec<&str> = first.switches.iter().map(|s| s.id.as_str()).collect();
    let mut right: Vec<&str> = second.switches.iter().map(|s| s.id.as_str()).collect();
    let count = connections.max(1).min(left.len()).min(right.len());

    let mut links = Vec::with_capacity(count);
    for _ in 0..count {
        let a = left.remove(rng.gen_range(0..left.len()));
        let b = right.remove(rng.gen_range(0..right.len()));
        let a_port = state.ports.allocate(a, ConnectionClass::DomainConnection)?;
        let b_port = state.ports.allocate(b, ConnectionClass::DomainConnection)?;
        debug!(
            "Connected domain {} ({}:{}) to domain {} ({}:{})",
            first.domain, a, a_port, second.domain, b, b_port
        );
        links.push(LogicalLink {
            a: a.to_string(),
            b: b.to_string(),
            a_port,
            b_port,
            a_domain: first.domain,
            b_domain: second.domain,
            class: ConnectionClass::DomainConnection,
        });
    }
    Ok(links)
}
