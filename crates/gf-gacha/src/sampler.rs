//! Categorical tier sampling via cumulative probability partitioning

use rand::Rng;

use crate::config::RateTable;

/// Precomputed cumulative-bound table for tier sampling
///
/// Bounds are monotonically non-decreasing in tier order. The last tier
/// covers any roll the accumulated bounds fail to reach (floating-point
/// shortfall at the upper edge), so a sample always resolves to a tier.
#[derive(Debug, Clone)]
pub struct TierSampler {
    bounds: Vec<f64>,
}

impl TierSampler {
    /// Build the cumulative bounds for a rate table
    pub fn for_table(table: &RateTable) -> Self {
        let mut bounds = Vec::with_capacity(table.tiers.len());
        let mut cumulative = 0.0;
        for tier in &table.tiers {
            cumulative += tier.rate;
            bounds.push(cumulative);
        }
        Self { bounds }
    }

    /// Draw one tier index using a single uniform roll in [0, 1)
    ///
    /// Stateless between calls: a pure function of the bounds and the
    /// rng stream.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let roll: f64 = rng.random();
        for (index, &bound) in self.bounds.iter().enumerate() {
            if roll < bound {
                return index;
            }
        }
        self.bounds.len() - 1
    }

    /// Cumulative upper bound for a tier index
    pub fn bound(&self, index: usize) -> Option<f64> {
        self.bounds.get(index).copied()
    }
}
