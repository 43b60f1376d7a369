//! Error types for configuring a growth simulation.

/// Reasons a [`crate::config::GrowthConfig`] can be rejected.
///
/// Validation happens once, before any simulation state is built. A running
/// simulation never produces these.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("radial subdivisions must be at least 3 (got {0})")]
    TooFewSubdivisions(usize),

    #[error("branch length must be positive (got {0})")]
    NonPositiveBranchLength(f32),

    #[error("growth exponent must be positive and finite (got {0})")]
    InvalidGrowthExponent(f32),

    #[error("time between iterations must be positive (got {0})")]
    NonPositiveInterval(f32),

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(e.to_string())
    }
}
