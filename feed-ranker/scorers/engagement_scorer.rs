use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::clients::engagement_model::EngagementModel;
use crate::util::request_util::now_millis;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::scorer::{CandidateScore, Scorer};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};

/// Predicts a signal vector per candidate. Candidates are scored concurrently
/// and independently; each prediction gets `timeout`, cut short by the
/// request deadline. A failed or late prediction excludes only its candidate.
pub struct EngagementScorer {
    pub model: Arc<dyn EngagementModel>,
    pub timeout: Duration,
}

#[async_trait]
impl Scorer<ScoredPostsQuery, PostCandidate> for EngagementScorer {
    async fn score(
        &self,
        query: &ScoredPostsQuery,
        candidates: &[PostCandidate],
    ) -> Result<Vec<CandidateScore<PostCandidate>>, StageError> {
        let last_scored_at_ms = Some(now_millis().max(0) as u64);
        let budget = Instant::now() + self.timeout;
        let deadline = query.deadline.map_or(budget, |d| d.min(budget));

        let predictions = candidates.iter().map(|candidate| async move {
            let prediction = self
                .model
                .predict(candidate, &query.viewer, &query.engagement_history);
            match timeout_at(deadline, prediction).await {
                Ok(Ok(signals)) => Ok(PostCandidate {
                    signals: Some(signals),
                    last_scored_at_ms,
                    ..Default::default()
                }),
                Ok(Err(err)) => Err(StageError::Client(err.to_string())),
                Err(_) => Err(StageError::TimedOut),
            }
        });

        Ok(join_all(predictions).await)
    }

    fn update(&self, candidate: &mut PostCandidate, scored: PostCandidate) {
        candidate.signals = scored.signals;
        candidate.last_scored_at_ms = scored.last_scored_at_ms;
    }
}
