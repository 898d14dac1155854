use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};
use std::time::Duration;

/// Removes posts at least `max_age` old, measured against the request clock.
/// Posts dated after the request clock are removed too.
pub struct AgeFilter {
    pub max_age: Duration,
}

impl AgeFilter {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    fn is_within_age(&self, now_ms: i64, created_at_ms: i64) -> bool {
        let age_ms = now_ms.saturating_sub(created_at_ms);
        age_ms >= 0 && (age_ms as u128) < self.max_age.as_millis()
    }
}

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for AgeFilter {
    async fn filter(
        &self,
        query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| self.is_within_age(query.now_ms, c.created_at_ms));

        Ok(FilterResult { kept, removed })
    }

    fn removal_reason(&self, candidate: &PostCandidate) -> String {
        format!(
            "created_at_ms={} outside the {}s window",
            candidate.created_at_ms,
            self.max_age.as_secs()
        )
    }
}
