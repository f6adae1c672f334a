//! Folding trial results into derived statistics

use serde::{Deserialize, Serialize};

use gf_gacha::{RateTable, TrialResult};

use crate::summary::{
    CumulativePoint, ExpectedTopTier, HistogramBucket, SimulationSummary, TierStats,
};

/// Fixed histogram bucket width over the pity horizon
pub const BUCKET_WIDTH: u32 = 50;

/// Running totals folded from trial results
///
/// `merge` is associative, and every statistic derived in `summarize` is
/// order-independent, so partial accumulators from parallel workers can
/// combine in any order. The empty accumulator is the merge identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialAccumulator {
    /// Trials folded in
    pub trial_count: u64,
    /// Draws across all folded trials
    pub total_draws: u64,
    /// Per-tier totals, indexed by tier position
    pub tier_counts: Vec<u64>,
    /// 1-based first-hit draw numbers from trials that hit the top tier
    pub first_hit_draws: Vec<u32>,
}

impl TrialAccumulator {
    /// Fold one trial result in
    pub fn record(&mut self, result: &TrialResult) {
        self.trial_count += 1;
        self.total_draws += u64::from(result.total_draws);
        if self.tier_counts.len() < result.tier_counts.len() {
            self.tier_counts.resize(result.tier_counts.len(), 0);
        }
        for (slot, &count) in self.tier_counts.iter_mut().zip(&result.tier_counts) {
            *slot += count;
        }
        if let Some(draw) = result.top_tier_draw {
            self.first_hit_draws.push(draw);
        }
    }

    /// Combine two partial accumulators
    pub fn merge(mut self, other: Self) -> Self {
        self.trial_count += other.trial_count;
        self.total_draws += other.total_draws;
        if self.tier_counts.len() < other.tier_counts.len() {
            self.tier_counts.resize(other.tier_counts.len(), 0);
        }
        for (slot, count) in self.tier_counts.iter_mut().zip(other.tier_counts) {
            *slot += count;
        }
        self.first_hit_draws.extend(other.first_hit_draws);
        self
    }

    /// Derive the full summary for a rate table
    pub fn summarize(&self, table: &RateTable) -> SimulationSummary {
        let per_tier = table
            .tiers
            .iter()
            .enumerate()
            .map(|(i, tier)| {
                let count = self.tier_counts.get(i).copied().unwrap_or(0);
                let empirical_pct = if self.total_draws > 0 {
                    count as f64 / self.total_draws as f64 * 100.0
                } else {
                    0.0
                };
                TierStats {
                    name: tier.name.clone(),
                    theoretical_pct: tier.theoretical_pct(),
                    empirical_pct,
                    count,
                }
            })
            .collect();

        let theoretical = table.theoretical_expected_draws();
        let empirical = if self.first_hit_draws.is_empty() {
            None
        } else {
            let sum: f64 = self.first_hit_draws.iter().map(|&d| f64::from(d)).sum();
            Some(sum / self.first_hit_draws.len() as f64)
        };

        SimulationSummary {
            trial_count: self.trial_count,
            total_draws: self.total_draws,
            average_draws_per_trial: if self.trial_count > 0 {
                self.total_draws as f64 / self.trial_count as f64
            } else {
                0.0
            },
            per_tier,
            expected_top_tier: ExpectedTopTier {
                theoretical,
                empirical,
                absolute_difference: empirical.map(|e| (theoretical - e).abs()),
            },
            histogram: self.histogram(table),
            cumulative_curve: self.cumulative_curve(table),
        }
    }

    /// First-hit distribution in fixed-width buckets over the pity horizon
    ///
    /// The final bucket's upper edge is inclusive of the pity threshold
    /// so a forced hit at exactly the ceiling is bucketed and the
    /// percentages sum to 100.
    fn histogram(&self, table: &RateTable) -> Vec<HistogramBucket> {
        if self.first_hit_draws.is_empty() {
            return Vec::new();
        }
        let hits = self.first_hit_draws.len() as f64;
        let pity = table.pity_threshold;

        let mut buckets = Vec::new();
        let mut start = 0u32;
        while start < pity {
            let upper = start + BUCKET_WIDTH;
            let last = upper >= pity;
            let count = self
                .first_hit_draws
                .iter()
                .filter(|&&d| d >= start && (d < upper || (last && d == pity)))
                .count() as u64;
            let range = if last {
                format!("{start}-{pity}")
            } else {
                format!("{start}-{}", upper - 1)
            };
            buckets.push(HistogramBucket {
                range,
                count,
                percentage: count as f64 / hits * 100.0,
            });
            start = upper;
        }
        buckets
    }

    /// Cumulative first-hit probability at bucket-width steps up to pity
    fn cumulative_curve(&self, table: &RateTable) -> Vec<CumulativePoint> {
        if self.first_hit_draws.is_empty() {
            return Vec::new();
        }
        let hits = self.first_hit_draws.len() as f64;
        let p = table.top_rate();

        let mut points = Vec::new();
        let mut draws = BUCKET_WIDTH;
        while draws <= table.pity_threshold {
            let theoretical_pct = (1.0 - (1.0 - p).powi(draws as i32)) * 100.0;
            let at_or_before = self.first_hit_draws.iter().filter(|&&d| d <= draws).count();
            points.push(CumulativePoint {
                draws,
                theoretical_pct,
                empirical_pct: at_or_before as f64 / hits * 100.0,
            });
            draws += BUCKET_WIDTH;
        }
        points
    }
}
