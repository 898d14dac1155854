use crate::candidate_pipeline::candidate::{Origin, PostCandidate};
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::clients::post_store::RetrievalClient;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::source::Source;
use std::sync::Arc;

/// Recommendations from outside the viewer's network, seeded by their
/// engagement history.
pub struct OutOfNetworkSource {
    pub retrieval_client: Arc<dyn RetrievalClient>,
    pub max_results: usize,
}

#[async_trait]
impl Source<ScoredPostsQuery, PostCandidate> for OutOfNetworkSource {
    fn enable(&self, query: &ScoredPostsQuery) -> bool {
        !query.in_network_only
    }

    async fn get_candidates(&self, query: &ScoredPostsQuery) -> Result<Vec<PostCandidate>, StageError> {
        let posts = self
            .retrieval_client
            .out_of_network_posts(&query.viewer, &query.engagement_history, self.max_results)
            .await
            .map_err(|e| StageError::Client(format!("OutOfNetworkSource: {}", e)))?;

        Ok(posts
            .into_iter()
            .map(|post| PostCandidate {
                origin: Some(Origin::OutOfNetwork),
                ..PostCandidate::from(post)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate_pipeline::candidate::PostRecord;
    use crate::clients::post_store::InMemoryPostStore;
    use crate::sources::in_network_source::InNetworkSource;
    use crate::test_util::{ids, query, NOW_MS};

    fn store() -> Arc<InMemoryPostStore> {
        let store = InMemoryPostStore::new(0);
        store.insert_posts(
            [(1, 10), (2, 20), (3, 10)]
                .into_iter()
                .map(|(post_id, author_id)| PostRecord {
                    post_id: Some(post_id),
                    author_id: Some(author_id),
                    created_at_ms: Some(NOW_MS - post_id as i64),
                    origin: Some(Origin::InNetwork),
                    ..Default::default()
                })
                .collect(),
        );
        Arc::new(store)
    }

    #[tokio::test]
    async fn sources_tag_origin() {
        let store = store();
        let mut q = query();
        q.viewer.following.insert(10);

        let in_network = InNetworkSource {
            retrieval_client: store.clone(),
            max_results: 10,
        };
        let oon = OutOfNetworkSource {
            retrieval_client: store,
            max_results: 10,
        };

        let in_candidates = in_network.get_candidates(&q).await.unwrap();
        assert_eq!(ids(&in_candidates), vec![1, 3]);
        assert!(in_candidates.iter().all(|c| c.origin == Some(Origin::InNetwork)));

        let oon_candidates = oon.get_candidates(&q).await.unwrap();
        assert_eq!(ids(&oon_candidates), vec![2]);
        assert_eq!(oon_candidates[0].origin, Some(Origin::OutOfNetwork));

        q.in_network_only = true;
        assert!(!oon.enable(&q));
    }
}
