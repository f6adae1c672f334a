//! Batch simulation runner

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use gf_gacha::{GachaError, GachaResult, RateTable, TierSampler, run_trial};

use crate::aggregate::TrialAccumulator;
use crate::summary::SimulationSummary;

/// Batch runner for independent pity trials
///
/// Each trial's rng stream is derived from the base seed and the trial
/// index; sequential and parallel runs with the same seed produce
/// identical summaries.
pub struct SimulationRunner {
    table: RateTable,
    seed: Option<u64>,
    parallel: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl SimulationRunner {
    /// Create a runner for a rate table
    pub fn new(table: RateTable) -> Self {
        Self {
            table,
            seed: None,
            parallel: false,
            cancel: None,
        }
    }

    /// Fix the base seed for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run trials on the rayon worker pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Attach a cooperative cancellation flag, checked between trials
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The configured rate table
    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Run `trial_count` independent trials and fold them into a summary
    ///
    /// Validates the table and the trial count up front. Work is bounded
    /// by `trial_count × max_draws_per_trial` sampling operations.
    pub fn run(&self, trial_count: u64) -> GachaResult<SimulationSummary> {
        self.table.validate()?;
        if trial_count < 1 {
            return Err(GachaError::InvalidTrialCount(trial_count));
        }

        let base_seed = self.seed.unwrap_or_else(rand::random);
        let sampler = TierSampler::for_table(&self.table);

        log::info!(
            "running {trial_count} trials (pity {}, cap {}, seed {base_seed:#018x}, {})",
            self.table.pity_threshold,
            self.table.max_draws_per_trial,
            if self.parallel { "parallel" } else { "sequential" }
        );

        let acc = if self.parallel {
            self.run_parallel(trial_count, base_seed, &sampler)?
        } else {
            self.run_sequential(trial_count, base_seed, &sampler)?
        };

        let summary = acc.summarize(&self.table);
        log::info!(
            "completed {} trials, {} draws total",
            summary.trial_count,
            summary.total_draws
        );
        Ok(summary)
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn run_sequential(
        &self,
        trial_count: u64,
        base_seed: u64,
        sampler: &TierSampler,
    ) -> GachaResult<TrialAccumulator> {
        let mut acc = TrialAccumulator::default();
        for index in 0..trial_count {
            if self.cancelled() {
                log::warn!("cancelled after {index} trials");
                return Err(GachaError::Cancelled);
            }
            let mut rng = trial_rng(base_seed, index);
            acc.record(&run_trial(&self.table, sampler, &mut rng));
        }
        Ok(acc)
    }

    fn run_parallel(
        &self,
        trial_count: u64,
        base_seed: u64,
        sampler: &TierSampler,
    ) -> GachaResult<TrialAccumulator> {
        log::debug!("parallel run across {} workers", num_cpus::get());

        let acc = (0..trial_count)
            .into_par_iter()
            .map(|index| {
                if self.cancelled() {
                    return None;
                }
                let mut rng = trial_rng(base_seed, index);
                Some(run_trial(&self.table, sampler, &mut rng))
            })
            .while_some()
            .fold(TrialAccumulator::default, |mut acc, result| {
                acc.record(&result);
                acc
            })
            .reduce(TrialAccumulator::default, TrialAccumulator::merge);

        if acc.trial_count < trial_count {
            log::warn!("cancelled after {} trials", acc.trial_count);
            return Err(GachaError::Cancelled);
        }
        Ok(acc)
    }
}

/// Derive the rng stream for one trial index
fn trial_rng(base_seed: u64, index: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_gacha::RarityTier;

    #[test]
    fn test_single_trial_run() {
        let runner = SimulationRunner::new(RateTable::standard()).with_seed(1);
        let summary = runner.run(1).unwrap();

        assert_eq!(summary.trial_count, 1);
        assert!(summary.total_draws >= 1);
        assert!(summary.total_draws <= 600);
        assert_eq!(summary.per_tier[0].count, 1);
        assert!(!summary.is_degenerate());
    }

    #[test]
    fn test_rejects_zero_trials() {
        let runner = SimulationRunner::new(RateTable::standard());
        assert!(matches!(
            runner.run(0),
            Err(GachaError::InvalidTrialCount(0))
        ));
    }

    #[test]
    fn test_rejects_invalid_table() {
        let table = RateTable {
            tiers: vec![
                RarityTier::new("top", 0.5),
                RarityTier::new("rest", 0.5),
            ],
            pity_threshold: 100,
            max_draws_per_trial: 50,
        };
        let runner = SimulationRunner::new(table);
        assert!(matches!(runner.run(10), Err(GachaError::InvalidConfig(_))));
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let a = SimulationRunner::new(RateTable::standard())
            .with_seed(42)
            .run(200)
            .unwrap();
        let b = SimulationRunner::new(RateTable::standard())
            .with_seed(42)
            .run(200)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = SimulationRunner::new(RateTable::standard())
            .with_seed(7)
            .run(300)
            .unwrap();
        let parallel = SimulationRunner::new(RateTable::standard())
            .with_seed(7)
            .with_parallel(true)
            .run(300)
            .unwrap();

        assert_eq!(sequential.trial_count, parallel.trial_count);
        assert_eq!(sequential.total_draws, parallel.total_draws);
        assert_eq!(sequential.per_tier, parallel.per_tier);
        assert_eq!(sequential.expected_top_tier, parallel.expected_top_tier);
        assert_eq!(sequential.histogram, parallel.histogram);
        assert_eq!(sequential.cumulative_curve, parallel.cumulative_curve);
    }

    #[test]
    fn test_preset_cancel_flag_aborts() {
        let flag = Arc::new(AtomicBool::new(true));

        let sequential = SimulationRunner::new(RateTable::standard())
            .with_cancel_flag(flag.clone())
            .run(100);
        assert!(matches!(sequential, Err(GachaError::Cancelled)));

        let parallel = SimulationRunner::new(RateTable::standard())
            .with_cancel_flag(flag)
            .with_parallel(true)
            .run(100);
        assert!(matches!(parallel, Err(GachaError::Cancelled)));
    }
}
