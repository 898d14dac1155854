use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};
use std::collections::HashSet;

/// A post and its reposts show the same content. A repost is dropped when
/// its original, or an earlier repost of it, is already in the feed.
/// Originals are never dropped here.
pub struct RepostDeduplicationFilter;

fn reposted_post(candidate: &PostCandidate) -> Option<u64> {
    candidate.original_post_id.filter(|_| candidate.is_repost)
}

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for RepostDeduplicationFilter {
    async fn filter(
        &self,
        _query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let mut in_feed: HashSet<u64> = HashSet::new();
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| match reposted_post(candidate) {
                Some(original) => in_feed.insert(original),
                None => {
                    in_feed.insert(candidate.post_id);
                    true
                }
            });

        Ok(FilterResult { kept, removed })
    }

    fn removal_reason(&self, candidate: &PostCandidate) -> String {
        match reposted_post(candidate) {
            Some(original) => format!("post {} already in the feed", original),
            None => self.name().to_string(),
        }
    }
}
