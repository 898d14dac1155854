use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};

/// A reply is served only when the viewer follows the author it replies to
/// or the author of the conversation root. Score plays no part.
pub struct ReplyEligibilityFilter;

fn is_eligible(query: &ScoredPostsQuery, candidate: &PostCandidate) -> bool {
    if !candidate.is_reply() {
        return true;
    }
    let follows = |author: Option<u64>| author.is_some_and(|id| query.viewer.follows(id));
    follows(candidate.in_reply_to_author_id) || follows(candidate.conversation_root_author_id)
}

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for ReplyEligibilityFilter {
    async fn filter(
        &self,
        query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| is_eligible(query, c));

        Ok(FilterResult { kept, removed })
    }
}
