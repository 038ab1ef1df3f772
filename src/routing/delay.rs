//! End-to-end delay estimation.

use log::error;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use std::collections::HashMap;

use super::types::{TrafficType, BEST_EFFORT};
use crate::error::{GenerationError, Result};

/// Per-traffic-type delay bounds used for the estimate
#[derive(Debug, Clone, Default)]
pub struct DelayModel {
    bounds: HashMap<String, (Option<f64>, Option<f64>)>,
}

impl DelayModel {
    pub fn new(traffic_types: &[TrafficType]) -> Self {
        let mut bounds = HashMap::new();
        for traffic_type in traffic_types {
            bounds
                .entry(traffic_type.name.clone())
                .or_insert((traffic_type.min_delay, traffic_type.max_delay));
        }
        Self { bounds }
    }

    /// `(min, max)` per-hop delay for a traffic type
    pub fn bounds(&self, traffic_type: &str) -> Result<(f64, f64)> {
        let (min, max) = *self.bounds.get(traffic_type).ok_or_else(|| {
            error!("Invalid traffic type: {}", traffic_type);
            GenerationError::UnknownTrafficType(traffic_type.to_string())
        })?;
        let (Some(min), Some(max)) = (min, max) else {
            error!("Stream delays 'min_delay' and 'max_delay' must be set for {}", traffic_type);
            return Err(GenerationError::MissingDelayBounds(traffic_type.to_string()));
        };
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max <= 0.0 || min > max {
            return Err(GenerationError::InvalidDelayBounds {
                traffic_type: traffic_type.to_string(),
                min,
                max,
            });
        }
        Ok((min, max))
    }

    /// Estimate the minimum end-to-end delay over `hops` links.
    ///
    /// A per-hop delay is drawn from a log-normal distribution around the mean
    /// of the bounds (sigma = population standard deviation of the bounds),
    /// clipped to the bounds, scaled by the hop count and capped at `deadline`.
    /// Best-effort traffic is always 0.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        traffic_type: &str,
        hops: usize,
        deadline: Option<f64>,
        rng: &mut R,
    ) -> Result<f64> {
        if traffic_type == BEST_EFFORT {
            return Ok(0.0);
        }
        let (min, max) = self.bounds(traffic_type)?;
        let mean = (min + max) / 2.0;
        let std_dev = (max - min) / 2.0;

        let distribution = LogNormal::new(mean.ln(), std_dev).map_err(|_| {
            GenerationError::InvalidDelayBounds {
                traffic_type: traffic_type.to_string(),
                min,
                max,
            }
        })?;
        let per_hop = distribution.sample(rng).clamp(min, max);

        let total = per_hop * hops as f64;
        Ok(match deadline {
            Some(deadline) => total.min(deadline),
            None => total,
        })
    }
}
