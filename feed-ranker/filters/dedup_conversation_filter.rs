use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};
use std::collections::HashMap;

/// One post per thread: the root and its replies compete, and the one with
/// the highest final score keeps the thread's place in the feed. On equal
/// scores the post the selector ranked first stays.
pub struct DedupConversationFilter;

fn final_score(candidate: &PostCandidate) -> f64 {
    candidate.score.unwrap_or(f64::NEG_INFINITY)
}

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for DedupConversationFilter {
    async fn filter(
        &self,
        _query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let mut kept: Vec<PostCandidate> = Vec::new();
        let mut removed = Vec::new();
        // thread id -> slot in `kept` holding its representative
        let mut thread_slot: HashMap<u64, usize> = HashMap::new();

        for candidate in candidates {
            let thread = candidate.conversation_id();
            match thread_slot.get(&thread) {
                Some(&slot) if final_score(&candidate) > final_score(&kept[slot]) => {
                    removed.push(std::mem::replace(&mut kept[slot], candidate));
                }
                Some(_) => removed.push(candidate),
                None => {
                    thread_slot.insert(thread, kept.len());
                    kept.push(candidate);
                }
            }
        }

        Ok(FilterResult { kept, removed })
    }

    fn removal_reason(&self, candidate: &PostCandidate) -> String {
        format!(
            "thread {} already represented in the feed",
            candidate.conversation_id()
        )
    }
}
