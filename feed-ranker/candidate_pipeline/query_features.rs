use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::candidate_pipeline::signals::Signal;
use crate::config::SeenSetConfig;
use crate::util::bloom_filter::BloomFilter;
use crate::util::tokenizer::MutedPhraseMatcher;

/// Stored viewer state, as kept by a [`crate::clients::viewer_store::ViewerStore`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerProfile {
    pub viewer_id: u64,
    pub followed_user_ids: Vec<u64>,
    pub blocked_user_ids: Vec<u64>,
    pub muted_user_ids: Vec<u64>,
    pub muted_keywords: Vec<String>,
    pub subscribed_user_ids: Vec<u64>,
    /// Impressions, oldest first.
    pub seen_post_ids: Vec<u64>,
    pub engagement_history: Vec<EngagementEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementEvent {
    pub post_id: u64,
    pub author_id: u64,
    pub action: Signal,
    pub timestamp_ms: i64,
}

/// Viewer state loaded once per request and shared read-only by every stage.
#[derive(Clone, Debug, Default)]
pub struct ViewerContext {
    pub viewer_id: u64,
    pub following: HashSet<u64>,
    pub blocked: HashSet<u64>,
    pub muted: HashSet<u64>,
    pub muted_keywords: Vec<String>,
    pub muted_phrases: MutedPhraseMatcher,
    pub subscribed: HashSet<u64>,
    pub seen: SeenPostSet,
}

impl ViewerContext {
    pub fn from_profile(profile: ViewerProfile, seen_config: &SeenSetConfig) -> Self {
        let mut seen = SeenPostSet::new(seen_config);
        for post_id in &profile.seen_post_ids {
            seen.insert(*post_id);
        }
        Self {
            viewer_id: profile.viewer_id,
            following: profile.followed_user_ids.into_iter().collect(),
            blocked: profile.blocked_user_ids.into_iter().collect(),
            muted: profile.muted_user_ids.into_iter().collect(),
            muted_phrases: MutedPhraseMatcher::new(profile.muted_keywords.as_slice()),
            muted_keywords: profile.muted_keywords,
            subscribed: profile.subscribed_user_ids.into_iter().collect(),
            seen,
        }
    }

    pub fn follows(&self, author_id: u64) -> bool {
        self.following.contains(&author_id)
    }
}

/// Impressions as a bloom filter plus the most recent ids held exactly.
///
/// Membership never misses an inserted id. An id outside the exact window may
/// be a bloom false positive, which only ever hides an unseen post.
#[derive(Clone, Debug)]
pub struct SeenPostSet {
    bloom: BloomFilter,
    recent: VecDeque<u64>,
    recent_capacity: usize,
}

impl Default for SeenPostSet {
    fn default() -> Self {
        Self::new(&SeenSetConfig::default())
    }
}

impl SeenPostSet {
    pub fn new(config: &SeenSetConfig) -> Self {
        Self {
            bloom: BloomFilter::with_false_positive_rate(
                config.expected_items,
                config.false_positive_rate,
            ),
            recent: VecDeque::with_capacity(config.recent_capacity),
            recent_capacity: config.recent_capacity,
        }
    }

    pub fn insert(&mut self, post_id: u64) {
        self.bloom.insert(post_id);
        if self.recent_capacity == 0 {
            return;
        }
        if self.recent.len() == self.recent_capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(post_id);
    }

    pub fn contains(&self, post_id: u64) -> bool {
        self.contains_recent(post_id) || self.bloom.may_contain(post_id)
    }

    pub fn contains_recent(&self, post_id: u64) -> bool {
        self.recent.contains(&post_id)
    }
}
