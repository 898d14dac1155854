use crate::candidate_pipeline::candidate::{Origin, PostCandidate};
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::clients::visibility_client::{FilteredReason, SafetyLevel, VisibilityClient};
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::hydrator::Hydrator;
use futures::future::join;
use std::collections::HashMap;
use std::sync::Arc;

/// Asks the visibility service about each selected candidate. In-network and
/// out-of-network posts are classified at different safety levels.
pub struct VFCandidateHydrator {
    pub vf_client: Arc<dyn VisibilityClient>,
}

impl VFCandidateHydrator {
    pub fn new(vf_client: Arc<dyn VisibilityClient>) -> Self {
        Self { vf_client }
    }

    async fn fetch_vf_results(
        &self,
        post_ids: Vec<u64>,
        safety_level: SafetyLevel,
        viewer_id: u64,
    ) -> Result<HashMap<u64, FilteredReason>, StageError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.vf_client
            .classify(&post_ids, safety_level, viewer_id)
            .await
            .map_err(|e| StageError::Client(e.to_string()))
    }
}

#[async_trait]
impl Hydrator<ScoredPostsQuery, PostCandidate> for VFCandidateHydrator {
    async fn hydrate(
        &self,
        query: &ScoredPostsQuery,
        candidates: &[PostCandidate],
    ) -> Result<Vec<PostCandidate>, StageError> {
        let (in_network_ids, oon_ids): (Vec<_>, Vec<_>) = candidates
            .iter()
            .partition(|c| c.origin == Some(Origin::InNetwork));
        let in_network_ids = in_network_ids.iter().map(|c| c.post_id).collect();
        let oon_ids = oon_ids.iter().map(|c| c.post_id).collect();

        let (in_network_result, oon_result) = join(
            self.fetch_vf_results(in_network_ids, SafetyLevel::TimelineHome, query.viewer_id),
            self.fetch_vf_results(
                oon_ids,
                SafetyLevel::TimelineHomeRecommendations,
                query.viewer_id,
            ),
        )
        .await;
        let mut result = in_network_result?;
        result.extend(oon_result?);

        Ok(candidates
            .iter()
            .map(|candidate| PostCandidate {
                visibility_reason: result.get(&candidate.post_id).cloned(),
                visibility_checked: true,
                ..Default::default()
            })
            .collect())
    }

    fn update(&self, candidate: &mut PostCandidate, hydrated: PostCandidate) {
        candidate.visibility_reason = hydrated.visibility_reason;
        candidate.visibility_checked = hydrated.visibility_checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::visibility_client::{SafetyAction, StaticVisibilityClient};
    use crate::test_util::{post, query};

    #[tokio::test]
    async fn oon_posts_use_the_stricter_level() {
        let client = StaticVisibilityClient::new([
            (1, FilteredReason::Safety(SafetyAction::Interstitial)),
            (2, FilteredReason::Safety(SafetyAction::Interstitial)),
        ]);
        let hydrator = VFCandidateHydrator::new(Arc::new(client));
        let oon = PostCandidate {
            origin: Some(Origin::OutOfNetwork),
            ..post(2, 11)
        };
        let candidates = vec![post(1, 10), oon, post(3, 10)];

        let hydrated = hydrator.hydrate(&query(), &candidates).await.unwrap();
        assert!(hydrated.iter().all(|c| c.visibility_checked));
        let reasons: Vec<_> = hydrated.into_iter().map(|c| c.visibility_reason).collect();
        assert_eq!(
            reasons,
            vec![
                Some(FilteredReason::Safety(SafetyAction::Interstitial)),
                Some(FilteredReason::Safety(SafetyAction::Drop)),
                None,
            ]
        );
    }
}
