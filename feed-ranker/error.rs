use candidate_pipeline::PipelineError;
use candidate_pipeline::candidate_pipeline::PipelineStage;
use thiserror::Error;

use crate::candidate_pipeline::signals::Signal;

/// Rejected configuration. Always raised before any request is served.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("weight table is missing signal '{0}'")]
    MissingWeight(Signal),

    #[error("weight table has unknown signal '{0}'")]
    UnknownSignal(String),

    #[error("weight for '{signal}' must be finite, got {value}")]
    NonFiniteWeight { signal: Signal, value: f64 },

    #[error("positive signal '{signal}' has negative weight {value}")]
    NegativePositiveWeight { signal: Signal, value: f64 },

    #[error("invalid {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("request {request_id} timed out during {stage:?}")]
    Timeout {
        request_id: String,
        stage: PipelineStage,
    },

    #[error("request {request_id}: {component} unavailable: {reason}")]
    Unavailable {
        request_id: String,
        component: &'static str,
        reason: String,
    },
}

impl From<PipelineError> for RankingError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::DeadlineExceeded { request_id, stage } => {
                RankingError::Timeout { request_id, stage }
            }
            PipelineError::QueryHydrationFailed {
                request_id,
                component,
                reason,
            } => RankingError::Unavailable {
                request_id,
                component,
                reason,
            },
        }
    }
}
