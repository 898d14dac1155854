use crate::candidate_pipeline::candidate::{Origin, PostCandidate};
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::clients::post_store::RetrievalClient;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::source::Source;
use std::sync::Arc;

/// Recent posts from accounts the viewer follows.
pub struct InNetworkSource {
    pub retrieval_client: Arc<dyn RetrievalClient>,
    pub max_results: usize,
}

#[async_trait]
impl Source<ScoredPostsQuery, PostCandidate> for InNetworkSource {
    fn enable(&self, query: &ScoredPostsQuery) -> bool {
        !query.viewer.following.is_empty()
    }

    async fn get_candidates(&self, query: &ScoredPostsQuery) -> Result<Vec<PostCandidate>, StageError> {
        let posts = self
            .retrieval_client
            .in_network_posts(&query.viewer, self.max_results)
            .await
            .map_err(|e| StageError::Client(format!("InNetworkSource: {}", e)))?;

        Ok(posts
            .into_iter()
            .map(|post| PostCandidate {
                origin: Some(Origin::InNetwork),
                ..PostCandidate::from(post)
            })
            .collect())
    }
}
