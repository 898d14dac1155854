use crate::candidate_pipeline::candidate::{Origin, PostCandidate};
use crate::candidate_pipeline::query::ScoredPostsQuery;

pub const NOW_MS: i64 = 1_700_000_000_000;
pub const VIEWER_ID: u64 = 1;

pub fn post(post_id: u64, author_id: u64) -> PostCandidate {
    PostCandidate {
        post_id,
        author_id,
        created_at_ms: NOW_MS - 60_000,
        origin: Some(Origin::InNetwork),
        text: format!("post number {post_id}"),
        ..Default::default()
    }
}

pub fn scored(post_id: u64, author_id: u64, score: f64) -> PostCandidate {
    PostCandidate {
        raw_score: Some(score),
        score: Some(score),
        ..post(post_id, author_id)
    }
}

pub fn query() -> ScoredPostsQuery {
    ScoredPostsQuery::new(VIEWER_ID, 10, NOW_MS, Vec::new(), Vec::new(), false, false)
}

pub fn ids(candidates: &[PostCandidate]) -> Vec<u64> {
    candidates.iter().map(|c| c.post_id).collect()
}
