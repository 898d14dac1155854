use crate::candidate_pipeline::candidate::{PostCandidate, PostRecord};
use crate::candidate_pipeline::feed_candidate_pipeline::{FeedCandidatePipeline, PipelineClients};
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::config::RankingConfig;
use crate::error::{ConfigError, RankingError};
use crate::util::request_util::now_millis;
use candidate_pipeline::candidate_pipeline::{CandidatePipeline, Exclusion, PipelineStage};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RankingRequest {
    pub viewer_id: u64,
    pub candidates: Vec<PostRecord>,
    /// Falls back to the configured default.
    pub result_size: Option<usize>,
    /// Reference clock in epoch millis; the wall clock when absent.
    pub now_ms: Option<i64>,
    pub served_ids: Vec<u64>,
    pub in_network_only: bool,
    pub is_bottom_request: bool,
    pub timeout_ms: Option<u64>,
    /// Accept a partial feed when the deadline passes after scoring.
    pub allow_partial: bool,
}

/// Stage group that excluded a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateState {
    Retrieved,
    PreFiltered,
    Scored,
    PostFiltered,
}

impl CandidateState {
    fn excluded_at(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::QueryHydrator | PipelineStage::Source | PipelineStage::Hydrator => {
                CandidateState::Retrieved
            }
            PipelineStage::Filter => CandidateState::PreFiltered,
            PipelineStage::Scorer => CandidateState::Scored,
            PipelineStage::Selector
            | PipelineStage::PostSelectionHydrator
            | PipelineStage::PostSelectionFilter => CandidateState::PostFiltered,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCandidate {
    pub post_id: u64,
    pub author_id: u64,
    pub final_score: f64,
    pub raw_score: f64,
    pub diversity_multiplier: f64,
    pub origin_multiplier: f64,
}

/// Diagnostic entry for a candidate that left the pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRecord {
    pub post_id: u64,
    /// Stage group that excluded the candidate.
    pub state: CandidateState,
    pub component: String,
    pub reason: String,
}

impl From<Exclusion<PostCandidate>> for ExclusionRecord {
    fn from(exclusion: Exclusion<PostCandidate>) -> Self {
        ExclusionRecord {
            post_id: exclusion.candidate.post_id,
            state: CandidateState::excluded_at(exclusion.stage),
            component: exclusion.component.to_string(),
            reason: exclusion.reason,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub request_id: String,
    pub selected: Vec<SelectedCandidate>,
    pub partial: bool,
    pub exclusions: Vec<ExclusionRecord>,
}

pub struct FeedRanker {
    pipeline: FeedCandidatePipeline,
    default_result_size: usize,
    max_result_size: usize,
    request_timeout: Duration,
    visibility_grace: Duration,
}

impl FeedRanker {
    pub fn new(config: RankingConfig, clients: PipelineClients) -> Result<Self, ConfigError> {
        let pipeline = FeedCandidatePipeline::build_with_clients(&config, clients)?;
        Ok(FeedRanker {
            pipeline,
            default_result_size: config.default_result_size,
            max_result_size: config.max_result_size,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            visibility_grace: Duration::from_millis(config.visibility_grace_ms),
        })
    }

    pub async fn rank(&self, request: RankingRequest) -> Result<RankingResponse, RankingError> {
        if request.viewer_id == 0 {
            return Err(RankingError::InvalidRequest(
                "viewer_id must be specified".to_string(),
            ));
        }
        let result_size = request.result_size.unwrap_or(self.default_result_size);
        if result_size == 0 || result_size > self.max_result_size {
            return Err(RankingError::InvalidRequest(format!(
                "result_size must be in 1..={}, got {}",
                self.max_result_size, result_size
            )));
        }

        let start = Instant::now();
        let timeout = request
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.request_timeout);
        let mut query = ScoredPostsQuery::new(
            request.viewer_id,
            result_size,
            request.now_ms.unwrap_or_else(now_millis),
            request.candidates,
            request.served_ids,
            request.in_network_only,
            request.is_bottom_request,
        );
        query.deadline = Some(tokio::time::Instant::now() + timeout);
        query.allow_partial = request.allow_partial;
        query.post_selection_grace = self.visibility_grace;
        info!(
            "Ranking request - request_id {} - {} pooled candidates",
            query.request_id,
            query.candidate_pool.len()
        );

        let pipeline_result = self.pipeline.execute(query).await?;
        let request_id = pipeline_result.query.request_id;

        let selected: Vec<SelectedCandidate> = pipeline_result
            .selected_candidates
            .into_iter()
            .filter_map(|candidate| {
                let (Some(final_score), Some(raw_score), Some(diversity), Some(origin)) = (
                    candidate.score,
                    candidate.raw_score,
                    candidate.diversity_multiplier,
                    candidate.origin_multiplier,
                ) else {
                    warn!(
                        "request_id={} post_id={} selected without a complete score, dropping",
                        request_id, candidate.post_id
                    );
                    return None;
                };
                Some(SelectedCandidate {
                    post_id: candidate.post_id,
                    author_id: candidate.author_id,
                    final_score,
                    raw_score,
                    diversity_multiplier: diversity,
                    origin_multiplier: origin,
                })
            })
            .collect();

        let exclusions: Vec<ExclusionRecord> = pipeline_result
            .excluded
            .into_iter()
            .map(ExclusionRecord::from)
            .collect();

        info!(
            "Ranking response - request_id {} - {} posts, {} excluded{} ({} ms)",
            request_id,
            selected.len(),
            exclusions.len(),
            if pipeline_result.partial { ", partial" } else { "" },
            start.elapsed().as_millis()
        );

        Ok(RankingResponse {
            request_id,
            selected,
            partial: pipeline_result.partial,
            exclusions,
        })
    }
}
