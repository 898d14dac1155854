use async_trait::async_trait;
use thiserror::Error;

use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query_features::{EngagementEvent, ViewerContext};
use crate::candidate_pipeline::signals::{SignalError, SignalVector};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("engagement model unavailable: {0}")]
    Unavailable(String),

    #[error("engagement model returned an invalid vector: {0}")]
    InvalidOutput(#[from] SignalError),
}

/// Predicts engagement probabilities for one candidate.
///
/// A prediction may depend only on its arguments. Implementations must not
/// look at other candidates of the same batch, which is what keeps a
/// candidate's score independent of what it is ranked against.
#[async_trait]
pub trait EngagementModel: Send + Sync {
    async fn predict(
        &self,
        candidate: &PostCandidate,
        viewer: &ViewerContext,
        history: &[EngagementEvent],
    ) -> Result<SignalVector, ModelError>;
}
