use thiserror::Error;

use crate::candidate_pipeline::PipelineStage;

/// Failure reported by a single pipeline component.
///
/// The orchestrator logs a component error and either keeps the stage input
/// unchanged or excludes the affected candidate. Only a required query
/// hydrator's error aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error("client call failed: {0}")]
    Client(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid output: {0}")]
    InvalidOutput(String),

    #[error("timed out")]
    TimedOut,
}

/// Failure of a whole pipeline run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("request_id={request_id} deadline exceeded during {stage:?}")]
    DeadlineExceeded {
        request_id: String,
        stage: PipelineStage,
    },

    #[error("request_id={request_id} required {component} failed: {reason}")]
    QueryHydrationFailed {
        request_id: String,
        component: &'static str,
        reason: String,
    },
}
