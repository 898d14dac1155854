use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};

/// Drops candidates the visibility service flagged for dropping, and any
/// candidate it never answered for.
pub struct VFFilter;

impl VFFilter {
    fn should_remove(candidate: &PostCandidate) -> bool {
        !candidate.visibility_checked
            || candidate
                .visibility_reason
                .as_ref()
                .is_some_and(|r| r.should_drop())
    }
}

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for VFFilter {
    async fn filter(
        &self,
        _query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(Self::should_remove);

        Ok(FilterResult { kept, removed })
    }

    fn removal_reason(&self, candidate: &PostCandidate) -> String {
        match &candidate.visibility_reason {
            Some(reason) if candidate.visibility_checked => format!("visibility: {:?}", reason),
            _ => "visibility unknown".to_string(),
        }
    }
}
