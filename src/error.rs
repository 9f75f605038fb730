// ⚠️ Pipeline Errors
// Initialization failures are fatal; per-request input never produces one.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Training set is empty or unusable
    #[error("Training error: {0}")]
    Training(String),

    /// Synthesizer or classifier parameters are out of range
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A composed payload broke one of its consistency rules
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
