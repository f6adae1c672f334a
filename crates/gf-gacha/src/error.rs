//! Error types for the gacha engine

use thiserror::Error;

/// Gacha engine error types
#[derive(Error, Debug)]
pub enum GachaError {
    /// Invalid rate table configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Trial count below the minimum of 1
    #[error("Invalid trial count: {0} (must be at least 1)")]
    InvalidTrialCount(u64),

    /// Run was cancelled between trials
    #[error("Simulation cancelled")]
    Cancelled,
}

/// Result type for gacha operations
pub type GachaResult<T> = Result<T, GachaError>;
