use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyAction {
    Drop,
    Interstitial,
    Label,
}

/// Why the visibility service flagged a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilteredReason {
    Spam,
    Deleted,
    AuthorSuspended,
    Safety(SafetyAction),
}

impl FilteredReason {
    /// Safety verdicts only drop on an explicit `Drop`; labelled or
    /// interstitial content may still be served. Every other reason drops.
    pub fn should_drop(&self) -> bool {
        match self {
            FilteredReason::Safety(action) => *action == SafetyAction::Drop,
            _ => true,
        }
    }
}

/// In-network posts are checked at `TimelineHome`; recommendations are held
/// to the stricter `TimelineHomeRecommendations` level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SafetyLevel {
    TimelineHome,
    TimelineHomeRecommendations,
}

#[async_trait]
pub trait VisibilityClient: Send + Sync {
    /// Posts absent from the returned map are unflagged.
    async fn classify(
        &self,
        post_ids: &[u64],
        safety_level: SafetyLevel,
        viewer_id: u64,
    ) -> anyhow::Result<HashMap<u64, FilteredReason>>;
}

/// Verdicts held in memory, keyed by post id.
#[derive(Default)]
pub struct StaticVisibilityClient {
    verdicts: DashMap<u64, FilteredReason>,
}

impl StaticVisibilityClient {
    pub fn new(verdicts: impl IntoIterator<Item = (u64, FilteredReason)>) -> Self {
        Self {
            verdicts: verdicts.into_iter().collect(),
        }
    }

    pub fn set_verdict(&self, post_id: u64, reason: FilteredReason) {
        self.verdicts.insert(post_id, reason);
    }
}

#[async_trait]
impl VisibilityClient for StaticVisibilityClient {
    async fn classify(
        &self,
        post_ids: &[u64],
        safety_level: SafetyLevel,
        _viewer_id: u64,
    ) -> anyhow::Result<HashMap<u64, FilteredReason>> {
        let mut result = HashMap::new();
        for post_id in post_ids {
            if let Some(verdict) = self.verdicts.get(post_id) {
                let reason = match (safety_level, verdict.value()) {
                    (
                        SafetyLevel::TimelineHomeRecommendations,
                        FilteredReason::Safety(SafetyAction::Interstitial),
                    ) => FilteredReason::Safety(SafetyAction::Drop),
                    (_, reason) => reason.clone(),
                };
                result.insert(*post_id, reason);
            }
        }
        Ok(result)
    }
}
