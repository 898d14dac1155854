use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};

/// Removes posts written by the viewer.
pub struct SelfPostFilter;

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for SelfPostFilter {
    async fn filter(
        &self,
        query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let viewer_id = query.viewer_id;
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| c.author_id != viewer_id);

        Ok(FilterResult { kept, removed })
    }
}
