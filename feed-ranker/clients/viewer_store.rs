use anyhow::anyhow;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::candidate_pipeline::query_features::{EngagementEvent, ViewerProfile};

#[async_trait]
pub trait ViewerStore: Send + Sync {
    async fn viewer_profile(&self, viewer_id: u64) -> anyhow::Result<ViewerProfile>;

    /// At most `limit` of the viewer's most recent engagements, oldest first.
    async fn engagement_history(
        &self,
        viewer_id: u64,
        limit: usize,
    ) -> anyhow::Result<Vec<EngagementEvent>>;
}

#[derive(Default)]
pub struct InMemoryViewerStore {
    profiles: DashMap<u64, ViewerProfile>,
}

impl InMemoryViewerStore {
    pub fn new(profiles: impl IntoIterator<Item = ViewerProfile>) -> Self {
        let store = Self::default();
        for profile in profiles {
            store.upsert(profile);
        }
        store
    }

    pub fn upsert(&self, profile: ViewerProfile) {
        self.profiles.insert(profile.viewer_id, profile);
    }

    /// Records an impression so later requests treat the post as seen.
    pub fn record_seen(&self, viewer_id: u64, post_id: u64) {
        self.profiles
            .entry(viewer_id)
            .or_insert_with(|| ViewerProfile {
                viewer_id,
                ..Default::default()
            })
            .seen_post_ids
            .push(post_id);
    }
}

#[async_trait]
impl ViewerStore for InMemoryViewerStore {
    async fn viewer_profile(&self, viewer_id: u64) -> anyhow::Result<ViewerProfile> {
        self.profiles
            .get(&viewer_id)
            .map(|profile| profile.value().clone())
            .ok_or_else(|| anyhow!("viewer {} not found", viewer_id))
    }

    async fn engagement_history(
        &self,
        viewer_id: u64,
        limit: usize,
    ) -> anyhow::Result<Vec<EngagementEvent>> {
        let profile = self
            .profiles
            .get(&viewer_id)
            .ok_or_else(|| anyhow!("viewer {} not found", viewer_id))?;
        let mut history = profile.engagement_history.clone();
        drop(profile);

        history.sort_by_key(|event| event.timestamp_ms);
        let skip = history.len().saturating_sub(limit);
        Ok(history.split_off(skip))
    }
}
