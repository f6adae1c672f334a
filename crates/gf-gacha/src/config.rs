//! Rate table configuration

use serde::{Deserialize, Serialize};

use crate::error::{GachaError, GachaResult};

/// Tolerance for the cumulative rate sum reaching 1.0
const RATE_SUM_TOLERANCE: f64 = 1e-6;

/// A single rarity tier with its configured pull rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityTier {
    /// Tier name (e.g., "legendary", "gold")
    pub name: String,
    /// Pull rate in (0, 1]
    pub rate: f64,
}

impl RarityTier {
    /// Create a new tier
    pub fn new(name: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }

    /// Theoretical appearance percentage (rate × 100)
    pub fn theoretical_pct(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Complete rate table: ordered tiers plus pity and safety settings
///
/// Tier order defines the cumulative partition order — the first tier is
/// checked first and is the pity-tracked top tier. Immutable once built;
/// shared read-only by every trial of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Tiers in evaluation order (index 0 = top tier)
    pub tiers: Vec<RarityTier>,
    /// Draws since the last top-tier hit at which one is forced
    pub pity_threshold: u32,
    /// Hard per-trial draw bound, independent of probability
    pub max_draws_per_trial: u32,
}

impl RateTable {
    /// The shipped banner configuration
    ///
    /// Four tiers with a 600-draw pity ceiling and a 1000-draw safety cap.
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                RarityTier::new("legendary", 0.002),
                RarityTier::new("gold", 0.012),
                RarityTier::new("orange", 0.30),
                RarityTier::new("purple", 0.686),
            ],
            pity_threshold: 600,
            max_draws_per_trial: 1000,
        }
    }

    /// Validate the configuration invariants
    ///
    /// Must pass before any simulation runs. Rejects empty tier lists,
    /// non-positive rates, a cumulative sum that fails to reach 1, a zero
    /// pity threshold, and a safety cap below the pity threshold.
    pub fn validate(&self) -> GachaResult<()> {
        if self.tiers.is_empty() {
            return Err(GachaError::InvalidConfig("no tiers defined".into()));
        }
        for tier in &self.tiers {
            if tier.rate <= 0.0 || tier.rate > 1.0 {
                return Err(GachaError::InvalidConfig(format!(
                    "tier '{}' rate {} outside (0, 1]",
                    tier.name, tier.rate
                )));
            }
        }
        let sum: f64 = self.tiers.iter().map(|t| t.rate).sum();
        if (sum - 1.0).abs() > RATE_SUM_TOLERANCE {
            return Err(GachaError::InvalidConfig(format!(
                "tier rates sum to {sum}, expected 1"
            )));
        }
        if self.pity_threshold == 0 {
            return Err(GachaError::InvalidConfig(
                "pity threshold must be positive".into(),
            ));
        }
        if self.max_draws_per_trial < self.pity_threshold {
            return Err(GachaError::InvalidConfig(format!(
                "safety cap {} below pity threshold {}",
                self.max_draws_per_trial, self.pity_threshold
            )));
        }
        Ok(())
    }

    /// The pity-tracked top tier
    pub fn top_tier(&self) -> &RarityTier {
        &self.tiers[0]
    }

    /// Top-tier pull rate
    pub fn top_rate(&self) -> f64 {
        self.tiers[0].rate
    }

    /// Number of tiers
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Theoretical expected draws to the first top-tier hit, ignoring pity
    pub fn theoretical_expected_draws(&self) -> f64 {
        1.0 / self.top_rate()
    }

    /// Export as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Import from JSON (validated)
    pub fn from_json(json: &str) -> GachaResult<Self> {
        let table: Self = serde_json::from_str(json)
            .map_err(|e| GachaError::InvalidConfig(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}
