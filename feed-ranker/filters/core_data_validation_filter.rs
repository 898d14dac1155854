use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};

/// Drops malformed candidates. The removal reason lists what was missing.
pub struct CoreDataValidationFilter;

fn problems(candidate: &PostCandidate) -> Vec<&'static str> {
    let mut problems = candidate.missing_fields.clone();
    if candidate.post_id == 0 && !problems.contains(&"post_id") {
        problems.push("post_id");
    }
    if candidate.author_id == 0 && !problems.contains(&"author_id") {
        problems.push("author_id");
    }
    if candidate.origin.is_none() {
        problems.push("origin");
    }
    problems
}

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for CoreDataValidationFilter {
    async fn filter(
        &self,
        _query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let (kept, removed) = candidates
            .into_iter()
            .partition(|c| problems(c).is_empty());
        Ok(FilterResult { kept, removed })
    }

    fn removal_reason(&self, candidate: &PostCandidate) -> String {
        format!("malformed candidate, missing {}", problems(candidate).join(", "))
    }
}
