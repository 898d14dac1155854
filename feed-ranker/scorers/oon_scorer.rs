use crate::candidate_pipeline::candidate::{Origin, PostCandidate};
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::params as p;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::scorer::{CandidateScore, Scorer};

// Prioritize in-network candidates over out-of-network candidates
pub struct OONScorer {
    pub factor: f64,
}

impl Default for OONScorer {
    fn default() -> Self {
        Self {
            factor: p::OON_WEIGHT_FACTOR,
        }
    }
}

impl OONScorer {
    pub fn multiplier(&self, origin: Origin) -> f64 {
        match origin {
            Origin::InNetwork => 1.0,
            Origin::OutOfNetwork => self.factor,
        }
    }
}

#[async_trait]
impl Scorer<ScoredPostsQuery, PostCandidate> for OONScorer {
    async fn score(
        &self,
        _query: &ScoredPostsQuery,
        candidates: &[PostCandidate],
    ) -> Result<Vec<CandidateScore<PostCandidate>>, StageError> {
        let scored = candidates
            .iter()
            .map(|c| {
                let origin = c
                    .origin
                    .ok_or_else(|| StageError::InvalidInput("unknown origin".to_string()))?;
                let penalized = PostCandidate {
                    raw_score: c.raw_score,
                    diversity_multiplier: c.diversity_multiplier,
                    origin_multiplier: Some(self.multiplier(origin)),
                    ..Default::default()
                };
                Ok(PostCandidate {
                    score: penalized.compose_score(),
                    ..penalized
                })
            })
            .collect();

        Ok(scored)
    }

    fn update(&self, candidate: &mut PostCandidate, scored: PostCandidate) {
        candidate.origin_multiplier = scored.origin_multiplier;
        candidate.score = scored.score;
    }
}
