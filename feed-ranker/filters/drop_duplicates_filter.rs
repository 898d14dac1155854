use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};
use std::collections::HashSet;

/// The same post id returned by more than one source is kept once.
pub struct DropDuplicatesFilter;

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for DropDuplicatesFilter {
    async fn filter(
        &self,
        _query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let mut seen_ids = HashSet::new();
        let (kept, removed) = candidates
            .into_iter()
            .partition(|c| seen_ids.insert(c.post_id));
        Ok(FilterResult { kept, removed })
    }
}
