use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::candidate_pipeline::query_features::ViewerContext;
use crate::clients::viewer_store::ViewerStore;
use crate::config::SeenSetConfig;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::query_hydrator::QueryHydrator;
use std::sync::Arc;

/// Loads the viewer's social graph, mutes, subscriptions and impressions.
pub struct ViewerContextQueryHydrator {
    pub viewer_store: Arc<dyn ViewerStore>,
    pub seen_set: SeenSetConfig,
}

#[async_trait]
impl QueryHydrator<ScoredPostsQuery> for ViewerContextQueryHydrator {
    /// The social filters read the viewer context.
    fn required(&self) -> bool {
        true
    }

    async fn hydrate(&self, query: &ScoredPostsQuery) -> Result<ScoredPostsQuery, StageError> {
        let profile = self
            .viewer_store
            .viewer_profile(query.viewer_id)
            .await
            .map_err(|e| StageError::Client(e.to_string()))?;
        if profile.viewer_id != query.viewer_id {
            return Err(StageError::InvalidOutput(format!(
                "asked for viewer {} and got {}",
                query.viewer_id, profile.viewer_id
            )));
        }

        Ok(ScoredPostsQuery {
            viewer: ViewerContext::from_profile(profile, &self.seen_set),
            ..Default::default()
        })
    }

    fn update(&self, query: &mut ScoredPostsQuery, hydrated: ScoredPostsQuery) {
        query.viewer = hydrated.viewer;
    }
}
