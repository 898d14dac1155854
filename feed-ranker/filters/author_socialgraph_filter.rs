use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};

// Remove candidates whose author the viewer blocked or muted
pub struct AuthorSocialgraphFilter;

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for AuthorSocialgraphFilter {
    async fn filter(
        &self,
        query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let viewer = &query.viewer;
        if viewer.blocked.is_empty() && viewer.muted.is_empty() {
            return Ok(FilterResult::pass_through(candidates));
        }

        let (removed, kept): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|c| {
            viewer.blocked.contains(&c.author_id) || viewer.muted.contains(&c.author_id)
        });

        Ok(FilterResult { kept, removed })
    }
}
