use crate::candidate_pipeline::candidate::{Origin, PostCandidate};
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::hydrator::Hydrator;

/// Fills in the origin of candidates that arrived without one. The viewer's
/// own posts count as in-network.
pub struct InNetworkCandidateHydrator;

#[async_trait]
impl Hydrator<ScoredPostsQuery, PostCandidate> for InNetworkCandidateHydrator {
    async fn hydrate(
        &self,
        query: &ScoredPostsQuery,
        candidates: &[PostCandidate],
    ) -> Result<Vec<PostCandidate>, StageError> {
        let viewer_id = query.viewer_id;
        let hydrated_candidates = candidates
            .iter()
            .map(|candidate| {
                let is_self = candidate.author_id == viewer_id;
                let origin = if is_self || query.viewer.follows(candidate.author_id) {
                    Origin::InNetwork
                } else {
                    Origin::OutOfNetwork
                };
                PostCandidate {
                    origin: Some(origin),
                    ..Default::default()
                }
            })
            .collect();

        Ok(hydrated_candidates)
    }

    fn update(&self, candidate: &mut PostCandidate, hydrated: PostCandidate) {
        if candidate.origin.is_none() {
            candidate.origin = hydrated.origin;
        }
    }
}
