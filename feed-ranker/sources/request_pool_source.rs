use crate::candidate_pipeline::candidate::{Origin, PostCandidate};
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::source::Source;

/// Candidates supplied directly with the request, in the order given.
pub struct RequestPoolSource;

#[async_trait]
impl Source<ScoredPostsQuery, PostCandidate> for RequestPoolSource {
    fn enable(&self, query: &ScoredPostsQuery) -> bool {
        !query.candidate_pool.is_empty()
    }

    async fn get_candidates(&self, query: &ScoredPostsQuery) -> Result<Vec<PostCandidate>, StageError> {
        Ok(query
            .candidate_pool
            .iter()
            .filter(|record| !(query.in_network_only && record.origin == Some(Origin::OutOfNetwork)))
            .cloned()
            .map(PostCandidate::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate_pipeline::candidate::PostRecord;
    use crate::test_util::{ids, query};

    fn record(post_id: u64, origin: Option<Origin>) -> PostRecord {
        PostRecord {
            post_id: Some(post_id),
            author_id: Some(10),
            created_at_ms: Some(1),
            origin,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn passes_pool_through_in_order() {
        let mut q = query();
        assert!(!RequestPoolSource.enable(&q));
        q.candidate_pool = vec![
            record(3, None),
            record(1, Some(Origin::OutOfNetwork)),
            record(2, Some(Origin::InNetwork)),
        ];
        assert!(RequestPoolSource.enable(&q));
        let candidates = RequestPoolSource.get_candidates(&q).await.unwrap();
        assert_eq!(ids(&candidates), vec![3, 1, 2]);

        q.in_network_only = true;
        let candidates = RequestPoolSource.get_candidates(&q).await.unwrap();
        assert_eq!(ids(&candidates), vec![3, 2]);
    }
}
