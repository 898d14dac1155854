use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};
use std::collections::HashSet;

/// Keeps the first candidate per content hash, in retrieval order. Candidates
/// without a hash are never considered duplicates.
pub struct DuplicateContentFilter;

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for DuplicateContentFilter {
    async fn filter(
        &self,
        _query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let mut seen_hashes: HashSet<u64> = HashSet::new();
        let (kept, removed) = candidates
            .into_iter()
            .partition(|c| match c.content_hash {
                Some(hash) => seen_hashes.insert(hash),
                None => true,
            });
        Ok(FilterResult { kept, removed })
    }
}
