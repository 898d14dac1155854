use candidate_pipeline::candidate_pipeline::{HasDeadline, HasRequestId};
use std::time::Duration;
use tokio::time::Instant;

use crate::candidate_pipeline::candidate::PostRecord;
use crate::candidate_pipeline::query_features::{EngagementEvent, ViewerContext};
use crate::util::request_util::generate_request_id;

#[derive(Clone, Default, Debug)]
pub struct ScoredPostsQuery {
    pub viewer_id: u64,
    pub result_size: usize,
    /// Reference clock for age checks, epoch millis.
    pub now_ms: i64,
    /// Posts supplied with the request, ranked alongside retrieved ones.
    pub candidate_pool: Vec<PostRecord>,
    pub served_ids: Vec<u64>,
    pub in_network_only: bool,
    pub is_bottom_request: bool,
    pub viewer: ViewerContext,
    /// Most recent engagements, oldest first.
    pub engagement_history: Vec<EngagementEvent>,
    pub deadline: Option<Instant>,
    pub allow_partial: bool,
    /// Visibility budget for a partial feed assembled after the deadline.
    pub post_selection_grace: Duration,
    pub request_id: String,
}

impl ScoredPostsQuery {
    pub fn new(
        viewer_id: u64,
        result_size: usize,
        now_ms: i64,
        candidate_pool: Vec<PostRecord>,
        served_ids: Vec<u64>,
        in_network_only: bool,
        is_bottom_request: bool,
    ) -> Self {
        let request_id = format!("{}-{}", generate_request_id(), viewer_id);
        Self {
            viewer_id,
            result_size,
            now_ms,
            candidate_pool,
            served_ids,
            in_network_only,
            is_bottom_request,
            viewer: ViewerContext {
                viewer_id,
                ..Default::default()
            },
            engagement_history: Vec::new(),
            deadline: None,
            allow_partial: false,
            post_selection_grace: Duration::ZERO,
            request_id,
        }
    }
}

impl HasRequestId for ScoredPostsQuery {
    fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl HasDeadline for ScoredPostsQuery {
    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn allow_partial(&self) -> bool {
        self.allow_partial
    }

    fn post_selection_grace(&self) -> Duration {
        self.post_selection_grace
    }
}
