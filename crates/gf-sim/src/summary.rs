//! Simulation summary output structures

use serde::{Deserialize, Serialize};

/// Theoretical vs empirical statistics for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    /// Tier name from the rate table
    pub name: String,
    /// Configured rate × 100
    pub theoretical_pct: f64,
    /// Accumulated count / total draws × 100
    pub empirical_pct: f64,
    /// Accumulated hit count across all trials
    pub count: u64,
}

/// Expected draws to the first top-tier hit
///
/// `empirical` is absent when no trial produced a top-tier hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedTopTier {
    /// 1 / top-tier rate (ignores the pity ceiling)
    pub theoretical: f64,
    /// Mean of observed first-hit draw numbers
    pub empirical: Option<f64>,
    /// |theoretical − empirical|
    pub absolute_difference: Option<f64>,
}

/// One fixed-width bucket of first-hit draw positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Draw range label, e.g. "550-600"
    pub range: String,
    /// First hits falling in this bucket
    pub count: u64,
    /// Bucket share of all first hits
    pub percentage: f64,
}

/// One point on the cumulative first-hit probability curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    /// Draw count d
    pub draws: u32,
    /// 1 − (1 − p)^d, as a percentage
    pub theoretical_pct: f64,
    /// Share of first hits at or before d
    pub empirical_pct: f64,
}

/// Complete statistics of one simulation run
///
/// Derived entirely from the folded trial results plus the rate table;
/// recomputed each run, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Trials executed
    pub trial_count: u64,
    /// Draws across all trials
    pub total_draws: u64,
    /// total_draws / trial_count
    pub average_draws_per_trial: f64,
    /// Per-tier comparison, in rate-table order
    pub per_tier: Vec<TierStats>,
    /// Expected-draws analysis for the top tier
    pub expected_top_tier: ExpectedTopTier,
    /// First-hit position distribution over the pity horizon
    pub histogram: Vec<HistogramBucket>,
    /// Cumulative first-hit probability, theoretical vs empirical
    pub cumulative_curve: Vec<CumulativePoint>,
}

impl SimulationSummary {
    /// True when no trial produced a top-tier hit
    ///
    /// In that state the histogram and cumulative curve are empty and
    /// the empirical expectation is absent.
    pub fn is_degenerate(&self) -> bool {
        self.expected_top_tier.empirical.is_none()
    }

    /// Export as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
