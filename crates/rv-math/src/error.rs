//! Error types for the odds model and weight partitioner

use thiserror::Error;

use crate::partition::BucketKind;

/// Math generation errors
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Invalid {parameter}: {value} (expected {expected})")]
    Validation {
        parameter: &'static str,
        value: String,
        expected: String,
    },

    #[error("Bullet count {adverse} out of range (expected {min}..={max})")]
    OutOfRange { adverse: u32, min: u32, max: u32 },

    #[error("Survival undefined: {adverse} bullets leave no empty chamber out of {total_slots}")]
    UndefinedSurvival { adverse: u32, total_slots: u32 },

    #[error("Degenerate ratio: {weight} weight units assigned to an empty {bucket} bucket")]
    DegenerateRatio { bucket: BucketKind, weight: u64 },

    #[error(
        "Weight space too small: {bucket} bucket holds {weight} units for {count} outcomes (expected at least one unit per outcome)"
    )]
    WeightSpaceTooSmall {
        bucket: BucketKind,
        weight: u64,
        count: u64,
    },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

impl MathError {
    /// Build a validation error for a parameter outside its accepted range
    pub fn validation(
        parameter: &'static str,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        Self::Validation {
            parameter,
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

/// Result type for math operations
pub type Result<T> = std::result::Result<T, MathError>;
