use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::util::candidates_util::rank_cmp;
use candidate_pipeline::selector::Selector;
use std::cmp::Ordering;

/// Orders by final score. Truncation to the requested size happens after the
/// post-selection filters, so they can backfill from lower ranks.
pub struct TopKScoreSelector;

impl Selector<ScoredPostsQuery, PostCandidate> for TopKScoreSelector {
    fn score(&self, candidate: &PostCandidate) -> f64 {
        candidate.score.unwrap_or(f64::NEG_INFINITY)
    }

    fn compare(&self, a: &PostCandidate, b: &PostCandidate) -> Ordering {
        rank_cmp(self.score(a), a, self.score(b), b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{ids, query, scored};

    #[test]
    fn sorts_by_score_then_recency_then_id() {
        let mut older = scored(1, 10, 2.0);
        older.created_at_ms -= 5_000;
        let candidates = vec![
            scored(2, 10, 1.0),
            older,
            scored(3, 11, 2.0),
            scored(4, 12, 2.0),
            scored(5, 13, 3.0),
        ];
        let selected = TopKScoreSelector.select(&query(), candidates);
        assert_eq!(ids(&selected), vec![5, 4, 3, 1, 2]);
    }

    #[test]
    fn unscored_candidates_sink() {
        let mut unscored = scored(1, 10, 0.0);
        unscored.score = None;
        let selected = TopKScoreSelector.select(&query(), vec![unscored, scored(2, 10, -1.0)]);
        assert_eq!(ids(&selected), vec![2, 1]);
    }
}
