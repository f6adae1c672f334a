//! # gf-sim — Batch Gacha Trial Simulator
//!
//! Runs many independent pity trials against a `gf-gacha` rate table and
//! reduces the raw results into comparable statistics: rarity
//! frequencies, expected-draws comparison, first-hit histogram, and
//! cumulative-probability curves.
//!
//! Aggregation is a pure associative fold (`TrialAccumulator`), so large
//! runs can fan out across the rayon worker pool and merge in any order.

pub mod aggregate;
pub mod runner;
pub mod summary;

pub use aggregate::*;
pub use runner::*;
pub use summary::*;
