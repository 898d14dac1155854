use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::candidate_pipeline::signals::{Polarity, Signal, SignalVector};
use crate::config::WeightTable;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::scorer::{CandidateScore, Scorer};

/// Signed contribution of every channel, in channel order. Negative channels
/// are subtracted by the magnitude of their weight.
pub fn contributions(signals: &SignalVector, weights: &WeightTable) -> Vec<(Signal, f64)> {
    signals
        .iter()
        .map(|(signal, probability)| {
            let weight = weights.weight(signal);
            let contribution = match signal.polarity() {
                Polarity::Positive => weight * probability,
                Polarity::Negative => -weight.abs() * probability,
            };
            (signal, contribution)
        })
        .collect()
}

/// Raw score of a signal vector. Summation runs in channel order, so equal
/// inputs always give bit-identical results.
pub fn combine(signals: &SignalVector, weights: &WeightTable) -> f64 {
    contributions(signals, weights)
        .into_iter()
        .map(|(_, contribution)| contribution)
        .sum()
}

/// Turns signal vectors into raw scores.
pub struct WeightedScorer {
    pub weights: WeightTable,
}

#[async_trait]
impl Scorer<ScoredPostsQuery, PostCandidate> for WeightedScorer {
    async fn score(
        &self,
        _query: &ScoredPostsQuery,
        candidates: &[PostCandidate],
    ) -> Result<Vec<CandidateScore<PostCandidate>>, StageError> {
        let scored = candidates
            .iter()
            .map(|c| {
                let signals = c
                    .signals
                    .as_ref()
                    .ok_or_else(|| StageError::InvalidInput("no signal vector".to_string()))?;
                let scored = PostCandidate {
                    raw_score: Some(combine(signals, &self.weights)),
                    diversity_multiplier: c.diversity_multiplier,
                    origin_multiplier: c.origin_multiplier,
                    ..Default::default()
                };
                Ok(PostCandidate {
                    score: scored.compose_score(),
                    ..scored
                })
            })
            .collect();

        Ok(scored)
    }

    fn update(&self, candidate: &mut PostCandidate, scored: PostCandidate) {
        candidate.raw_score = scored.raw_score;
        candidate.score = scored.score;
    }
}
