use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::params as p;
use crate::util::candidates_util::rank_cmp;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::scorer::{CandidateScore, Scorer};
use std::collections::HashMap;

/// Diversify authors served within a single feed response.
///
/// Two passes over the batch: group candidates by author, then walk each
/// group in rank order and give the n-th post (1-based) the multiplier
/// `max(floor, base^(n-1))`. A candidate's own score never changes its
/// author's other posts except through that ordering.
pub struct AuthorDiversityScorer {
    base: f64,
    floor: f64,
}

impl Default for AuthorDiversityScorer {
    fn default() -> Self {
        Self::new(p::AUTHOR_DIVERSITY_DECAY, p::AUTHOR_DIVERSITY_FLOOR)
    }
}

impl AuthorDiversityScorer {
    pub fn new(base: f64, floor: f64) -> Self {
        Self { base, floor }
    }

    /// Multiplier for an author's `position`-th post, counting from 1.
    pub fn multiplier(&self, position: usize) -> f64 {
        let exponent = position.saturating_sub(1) as f64;
        self.base.powf(exponent).max(self.floor)
    }
}

#[async_trait]
impl Scorer<ScoredPostsQuery, PostCandidate> for AuthorDiversityScorer {
    async fn score(
        &self,
        _query: &ScoredPostsQuery,
        candidates: &[PostCandidate],
    ) -> Result<Vec<CandidateScore<PostCandidate>>, StageError> {
        let mut scored: Vec<CandidateScore<PostCandidate>> = candidates
            .iter()
            .map(|_| Err(StageError::InvalidInput("no raw score".to_string())))
            .collect();

        let mut by_author: HashMap<u64, Vec<(usize, f64)>> = HashMap::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            if let Some(raw) = candidate.raw_score {
                by_author.entry(candidate.author_id).or_default().push((idx, raw));
            }
        }

        for group in by_author.values_mut() {
            group.sort_by(|(a_idx, a_raw), (b_idx, b_raw)| {
                rank_cmp(*a_raw, &candidates[*a_idx], *b_raw, &candidates[*b_idx])
            });
            for (rank, (idx, _)) in group.iter().enumerate() {
                let candidate = &candidates[*idx];
                let diversified = PostCandidate {
                    raw_score: candidate.raw_score,
                    diversity_multiplier: Some(self.multiplier(rank + 1)),
                    origin_multiplier: candidate.origin_multiplier,
                    ..Default::default()
                };
                scored[*idx] = Ok(PostCandidate {
                    score: diversified.compose_score(),
                    ..diversified
                });
            }
        }

        Ok(scored)
    }

    fn update(&self, candidate: &mut PostCandidate, scored: PostCandidate) {
        candidate.diversity_multiplier = scored.diversity_multiplier;
        candidate.score = scored.score;
    }
}
