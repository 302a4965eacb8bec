//! Error kinds surfaced by the engine.
//!
//! Configuration problems are reported at construction time. Precondition
//! violations signal a protocol bug between caller and engine and abort the run.
//! Objective failures carry the caller's error untouched as the source.

use swarm_resilience::ResilienceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("invalid configuration: {0}")] Config(String),
    #[error("dimension mismatch: expected {expected}, got {actual}")] DimensionMismatch { expected: usize, actual: usize },
    #[error("precondition violated: {0}")] Precondition(&'static str),
    #[error("objective function failed: {0}")] Objective(#[source] anyhow::Error),
    #[error(transparent)] Cancelled(#[from] ResilienceError),
    #[error("worker pool unavailable: {0}")] ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SwarmError>;

impl SwarmError {
    pub(crate) fn config(msg: impl Into<String>) -> Self { Self::Config(msg.into()) }

    pub(crate) fn check_dimension(expected: usize, actual: usize) -> Result<()> {
        if expected == actual { Ok(()) } else { Err(Self::DimensionMismatch { expected, actual }) }
    }

    /// The caller's own error when the run aborted inside the objective.
    pub fn objective_source(&self) -> Option<&anyhow::Error> {
        match self { Self::Objective(e) => Some(e), _ => None }
    }
}
