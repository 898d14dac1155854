use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::util::candidates_util::content_hash;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::hydrator::Hydrator;

/// Computes a content hash from the post text when the record did not carry one.
pub struct ContentHashHydrator;

#[async_trait]
impl Hydrator<ScoredPostsQuery, PostCandidate> for ContentHashHydrator {
    async fn hydrate(
        &self,
        _query: &ScoredPostsQuery,
        candidates: &[PostCandidate],
    ) -> Result<Vec<PostCandidate>, StageError> {
        Ok(candidates
            .iter()
            .map(|candidate| PostCandidate {
                content_hash: candidate.content_hash.or_else(|| content_hash(&candidate.text)),
                ..Default::default()
            })
            .collect())
    }

    fn update(&self, candidate: &mut PostCandidate, hydrated: PostCandidate) {
        candidate.content_hash = hydrated.content_hash;
    }
}
