use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::clients::viewer_store::ViewerStore;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::query_hydrator::QueryHydrator;
use std::sync::Arc;

/// Hydrate the viewer's most recent engagements, capped at `depth` and
/// excluding anything stamped after the request clock.
pub struct EngagementHistoryQueryHydrator {
    pub viewer_store: Arc<dyn ViewerStore>,
    pub depth: usize,
}

#[async_trait]
impl QueryHydrator<ScoredPostsQuery> for EngagementHistoryQueryHydrator {
    async fn hydrate(&self, query: &ScoredPostsQuery) -> Result<ScoredPostsQuery, StageError> {
        let mut history = self
            .viewer_store
            .engagement_history(query.viewer_id, self.depth)
            .await
            .map_err(|e| StageError::Client(format!("failed to fetch engagement history: {}", e)))?;

        history.retain(|event| event.timestamp_ms <= query.now_ms);
        history.sort_by_key(|event| event.timestamp_ms);
        let excess = history.len().saturating_sub(self.depth);
        history.drain(..excess);

        Ok(ScoredPostsQuery {
            engagement_history: history,
            ..Default::default()
        })
    }

    fn update(&self, query: &mut ScoredPostsQuery, hydrated: ScoredPostsQuery) {
        query.engagement_history = hydrated.engagement_history;
    }
}
