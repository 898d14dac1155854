use std::cmp::Ordering;
use xxhash_rust::xxh3::xxh3_64;

use crate::candidate_pipeline::candidate::PostCandidate;

/// Ranking order: higher score first, then newer, then higher post id.
/// `Less` means `a` ranks ahead of `b`.
pub fn rank_cmp(a_score: f64, a: &PostCandidate, b_score: f64, b: &PostCandidate) -> Ordering {
    b_score
        .total_cmp(&a_score)
        .then_with(|| b.created_at_ms.cmp(&a.created_at_ms))
        .then_with(|| b.post_id.cmp(&a.post_id))
}

/// The candidate's own id plus the post it reposts, if any.
pub fn get_related_post_ids(candidate: &PostCandidate) -> Vec<u64> {
    let mut ids = vec![candidate.post_id];
    if let Some(original) = candidate.original_post_id {
        ids.push(original);
    }
    ids
}

/// Hash of the lowercased text with whitespace collapsed, or `None` for text
/// with no visible content.
pub fn content_hash(text: &str) -> Option<u64> {
    let normalized = text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    if normalized.is_empty() {
        return None;
    }
    Some(xxh3_64(normalized.as_bytes()))
}
