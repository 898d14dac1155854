use serde::{Deserialize, Serialize};

use crate::candidate_pipeline::signals::SignalVector;
use crate::clients::visibility_client::FilteredReason;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    InNetwork,
    OutOfNetwork,
}

/// A post as handed to the ranker by a retrieval pool or a request. Every
/// field is optional on the wire; missing core fields are caught by
/// validation rather than at parse time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostRecord {
    pub post_id: Option<u64>,
    pub author_id: Option<u64>,
    pub created_at_ms: Option<i64>,
    pub origin: Option<Origin>,
    pub text: Option<String>,
    pub content_hash: Option<u64>,
    pub conversation_root_id: Option<u64>,
    pub conversation_root_author_id: Option<u64>,
    pub in_reply_to_post_id: Option<u64>,
    pub in_reply_to_author_id: Option<u64>,
    pub is_repost: bool,
    pub original_post_id: Option<u64>,
    pub paywall_author_id: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct PostCandidate {
    pub post_id: u64,
    pub author_id: u64,
    pub created_at_ms: i64,
    pub origin: Option<Origin>,
    pub text: String,
    pub content_hash: Option<u64>,
    pub conversation_root_id: Option<u64>,
    pub conversation_root_author_id: Option<u64>,
    pub in_reply_to_post_id: Option<u64>,
    pub in_reply_to_author_id: Option<u64>,
    pub is_repost: bool,
    pub original_post_id: Option<u64>,
    pub paywall_author_id: Option<u64>,
    /// Fields missing from the source record, reported by validation.
    pub missing_fields: Vec<&'static str>,
    pub signals: Option<SignalVector>,
    pub last_scored_at_ms: Option<u64>,
    pub raw_score: Option<f64>,
    pub diversity_multiplier: Option<f64>,
    pub origin_multiplier: Option<f64>,
    pub score: Option<f64>,
    pub visibility_reason: Option<FilteredReason>,
    /// Set once the visibility service has answered for this post.
    pub visibility_checked: bool,
}

impl From<PostRecord> for PostCandidate {
    fn from(record: PostRecord) -> Self {
        let mut missing_fields = Vec::new();
        if record.post_id.is_none() {
            missing_fields.push("post_id");
        }
        if record.author_id.is_none() {
            missing_fields.push("author_id");
        }
        if record.created_at_ms.is_none() {
            missing_fields.push("created_at_ms");
        }
        if record.is_repost && record.original_post_id.is_none() {
            missing_fields.push("original_post_id");
        }

        Self {
            post_id: record.post_id.unwrap_or_default(),
            author_id: record.author_id.unwrap_or_default(),
            created_at_ms: record.created_at_ms.unwrap_or_default(),
            origin: record.origin,
            text: record.text.unwrap_or_default(),
            content_hash: record.content_hash,
            conversation_root_id: record.conversation_root_id,
            conversation_root_author_id: record.conversation_root_author_id,
            in_reply_to_post_id: record.in_reply_to_post_id,
            in_reply_to_author_id: record.in_reply_to_author_id,
            is_repost: record.is_repost,
            original_post_id: record.original_post_id,
            paywall_author_id: record.paywall_author_id,
            missing_fields,
            ..Default::default()
        }
    }
}

impl PostCandidate {
    pub fn is_reply(&self) -> bool {
        self.in_reply_to_post_id.is_some()
    }

    /// Posts outside any conversation are their own thread.
    pub fn conversation_id(&self) -> u64 {
        self.conversation_root_id.unwrap_or(self.post_id)
    }

    /// raw x diversity x origin, with a missing multiplier counting as 1.0.
    pub fn compose_score(&self) -> Option<f64> {
        self.raw_score.map(|raw| {
            raw * self.diversity_multiplier.unwrap_or(1.0) * self.origin_multiplier.unwrap_or(1.0)
        })
    }
}
