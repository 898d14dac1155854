use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use feed_ranker::candidate_pipeline::candidate::{Origin, PostCandidate, PostRecord};
use feed_ranker::candidate_pipeline::feed_candidate_pipeline::PipelineClients;
use feed_ranker::candidate_pipeline::query_features::{
    EngagementEvent, ViewerContext, ViewerProfile,
};
use feed_ranker::candidate_pipeline::signals::{Polarity, Signal, SignalVector};
use feed_ranker::clients::engagement_model::{EngagementModel, ModelError};
use feed_ranker::clients::post_store::{InMemoryPostStore, RetrievalClient};
use feed_ranker::clients::viewer_store::InMemoryViewerStore;
use feed_ranker::clients::visibility_client::{
    FilteredReason, SafetyAction, SafetyLevel, StaticVisibilityClient, VisibilityClient,
};
use feed_ranker::config::RankingConfig;
use feed_ranker::error::RankingError;
use feed_ranker::{CandidateState, FeedRanker, RankingRequest, RankingResponse};

const NOW_MS: i64 = 1_700_000_000_000;
const VIEWER: u64 = 1;
const HOUR_MS: i64 = 3_600_000;

/// Serves a fixed vector per post id. Unknown ids fail; stalled ids never answer.
#[derive(Default)]
struct TableModel {
    vectors: HashMap<u64, SignalVector>,
    stalled: HashSet<u64>,
}

impl TableModel {
    fn favorite(mut self, post_id: u64, probability: f64) -> Self {
        self.vectors.insert(post_id, favorite(probability));
        self
    }

    fn vector(mut self, post_id: u64, vector: SignalVector) -> Self {
        self.vectors.insert(post_id, vector);
        self
    }

    fn stall(mut self, post_id: u64) -> Self {
        self.stalled.insert(post_id);
        self
    }
}

#[async_trait]
impl EngagementModel for TableModel {
    async fn predict(
        &self,
        candidate: &PostCandidate,
        _viewer: &ViewerContext,
        _history: &[EngagementEvent],
    ) -> Result<SignalVector, ModelError> {
        if self.stalled.contains(&candidate.post_id) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.vectors
            .get(&candidate.post_id)
            .cloned()
            .ok_or_else(|| ModelError::Unavailable(format!("no prediction for {}", candidate.post_id)))
    }
}

struct UnreachableVisibility;

#[async_trait]
impl VisibilityClient for UnreachableVisibility {
    async fn classify(
        &self,
        _post_ids: &[u64],
        _safety_level: SafetyLevel,
        _viewer_id: u64,
    ) -> anyhow::Result<HashMap<u64, FilteredReason>> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

fn favorite(probability: f64) -> SignalVector {
    SignalVector::from_pairs(Signal::ALL.iter().map(|signal| {
        let value = if *signal == Signal::Favorite { probability } else { 0.0 };
        (*signal, value)
    }))
    .unwrap()
}

fn all_positive() -> SignalVector {
    SignalVector::from_pairs(Signal::ALL.iter().map(|signal| {
        let value = if signal.polarity() == Polarity::Positive { 1.0 } else { 0.0 };
        (*signal, value)
    }))
    .unwrap()
}

fn profile() -> ViewerProfile {
    ViewerProfile {
        viewer_id: VIEWER,
        followed_user_ids: (10..20).collect(),
        ..Default::default()
    }
}

fn record(post_id: u64, author_id: u64) -> PostRecord {
    PostRecord {
        post_id: Some(post_id),
        author_id: Some(author_id),
        created_at_ms: Some(NOW_MS - 60_000),
        text: Some(format!("post number {post_id}")),
        ..Default::default()
    }
}

fn reply(post_id: u64, author_id: u64, parent_author: u64, root_author: u64) -> PostRecord {
    PostRecord {
        in_reply_to_post_id: Some(100),
        in_reply_to_author_id: Some(parent_author),
        conversation_root_id: Some(100),
        conversation_root_author_id: Some(root_author),
        ..record(post_id, author_id)
    }
}

fn request(candidates: Vec<PostRecord>) -> RankingRequest {
    RankingRequest {
        viewer_id: VIEWER,
        candidates,
        now_ms: Some(NOW_MS),
        ..Default::default()
    }
}

fn ranker_with(config: RankingConfig, model: TableModel, profile: ViewerProfile) -> FeedRanker {
    let clients = PipelineClients {
        model: Arc::new(model),
        retrieval: None,
        viewer_store: Arc::new(InMemoryViewerStore::new([profile])),
        visibility: Arc::new(StaticVisibilityClient::default()),
    };
    FeedRanker::new(config, clients).unwrap()
}

fn ranker(model: TableModel) -> FeedRanker {
    ranker_with(RankingConfig::default(), model, profile())
}

fn selected_ids(response: &RankingResponse) -> Vec<u64> {
    response.selected.iter().map(|c| c.post_id).collect()
}

fn excluded_by<'a>(response: &'a RankingResponse, post_id: u64) -> Option<(&'a str, CandidateState)> {
    response
        .exclusions
        .iter()
        .find(|e| e.post_id == post_id)
        .map(|e| (e.component.as_str(), e.state))
}

#[tokio::test]
async fn same_author_scores_decay_to_the_floor() {
    let model = (1..=6).fold(TableModel::default(), |m, id| m.favorite(id, 0.5));
    let response = ranker(model)
        .rank(request((1..=6).map(|id| record(id, 10)).collect()))
        .await
        .unwrap();

    let multipliers: Vec<f64> = response
        .selected
        .iter()
        .map(|c| c.diversity_multiplier)
        .collect();
    let expected = [1.0, 0.45, 0.2025, 0.10, 0.10, 0.10];
    assert_eq!(multipliers.len(), expected.len());
    for (got, want) in multipliers.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "{got} != {want}");
    }

    let finals: Vec<f64> = response.selected.iter().map(|c| c.final_score).collect();
    assert!(finals[0] > finals[1] && finals[1] > finals[2] && finals[2] > finals[3]);
    assert!(finals[3..].windows(2).all(|w| (w[0] - w[1]).abs() < 1e-12));
    // equal raw scores rank by id once recency ties
    assert_eq!(selected_ids(&response), vec![6, 5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn out_of_network_scales_by_factor_exactly() {
    let model = TableModel::default().favorite(1, 0.8).favorite(2, 0.8);
    let response = ranker(model)
        .rank(request(vec![record(1, 10), record(2, 20)]))
        .await
        .unwrap();

    let by_id: HashMap<u64, _> = response.selected.iter().map(|c| (c.post_id, c)).collect();
    let in_network = by_id[&1];
    let oon = by_id[&2];
    assert_eq!(in_network.diversity_multiplier, oon.diversity_multiplier);
    assert_eq!(oon.origin_multiplier, 0.7);
    assert!((oon.final_score / in_network.final_score - 0.7).abs() < 1e-12);
}

#[tokio::test]
async fn supplied_origin_is_kept() {
    let model = TableModel::default().favorite(1, 0.8);
    let oon_from_followed = PostRecord {
        origin: Some(Origin::OutOfNetwork),
        ..record(1, 10)
    };
    let response = ranker(model)
        .rank(request(vec![oon_from_followed]))
        .await
        .unwrap();
    assert_eq!(response.selected[0].origin_multiplier, 0.7);
}

#[tokio::test]
async fn thread_keeps_only_its_best_reply() {
    let model = TableModel::default()
        .favorite(1, 0.5)
        .favorite(2, 0.9)
        .favorite(3, 0.3)
        .favorite(4, 0.1);
    let candidates = vec![
        reply(1, 20, 11, 11),
        reply(2, 21, 11, 11),
        reply(3, 22, 11, 11),
        record(4, 10),
    ];
    let response = ranker(model).rank(request(candidates)).await.unwrap();

    assert_eq!(selected_ids(&response), vec![2, 4]);
    for dropped in [1, 3] {
        assert_eq!(
            excluded_by(&response, dropped),
            Some(("DedupConversationFilter", CandidateState::PostFiltered))
        );
    }
}

#[tokio::test]
async fn thread_dedup_runs_before_truncation() {
    let model = TableModel::default()
        .favorite(1, 0.9)
        .favorite(2, 0.8)
        .favorite(3, 0.1);
    let mut req = request(vec![reply(1, 20, 11, 11), reply(2, 21, 11, 11), record(3, 12)]);
    req.result_size = Some(2);
    let response = ranker(model).rank(req).await.unwrap();
    assert_eq!(selected_ids(&response), vec![1, 3]);
}

#[tokio::test]
async fn own_posts_are_never_selected() {
    let model = TableModel::default().vector(1, all_positive()).favorite(2, 0.1);
    let response = ranker(model)
        .rank(request(vec![record(1, VIEWER), record(2, 10)]))
        .await
        .unwrap();

    assert_eq!(selected_ids(&response), vec![2]);
    assert_eq!(
        excluded_by(&response, 1),
        Some(("SelfPostFilter", CandidateState::PreFiltered))
    );
}

#[tokio::test]
async fn reply_into_unfollowed_thread_is_dropped_despite_max_score() {
    let model = TableModel::default()
        .vector(1, all_positive())
        .vector(2, all_positive())
        .favorite(3, 0.1);
    let candidates = vec![
        reply(1, 10, 30, 31),
        PostRecord {
            conversation_root_id: Some(200),
            ..reply(2, 10, 30, 12)
        },
        record(3, 11),
    ];
    let response = ranker(model).rank(request(candidates)).await.unwrap();

    assert_eq!(selected_ids(&response), vec![2, 3]);
    assert_eq!(
        excluded_by(&response, 1),
        Some(("ReplyEligibilityFilter", CandidateState::PostFiltered))
    );
}

#[tokio::test]
async fn max_age_boundary_is_exclusive() {
    let model = TableModel::default().favorite(1, 0.5).favorite(2, 0.5);
    let at_limit = PostRecord {
        created_at_ms: Some(NOW_MS - 48 * HOUR_MS),
        ..record(1, 10)
    };
    let just_inside = PostRecord {
        created_at_ms: Some(NOW_MS - 48 * HOUR_MS + 60_000),
        ..record(2, 11)
    };
    let response = ranker(model)
        .rank(request(vec![at_limit, just_inside]))
        .await
        .unwrap();

    assert_eq!(selected_ids(&response), vec![2]);
    assert_eq!(excluded_by(&response, 1).map(|e| e.0), Some("AgeFilter"));
}

#[tokio::test]
async fn duplicate_content_keeps_first_retrieved() {
    let model = TableModel::default().favorite(1, 0.1).favorite(2, 0.9);
    let first = PostRecord {
        text: Some("Same words".to_string()),
        ..record(1, 10)
    };
    let copy = PostRecord {
        text: Some("  same   WORDS ".to_string()),
        ..record(2, 11)
    };
    let response = ranker(model).rank(request(vec![first, copy])).await.unwrap();

    assert_eq!(selected_ids(&response), vec![1]);
    assert_eq!(
        excluded_by(&response, 2).map(|e| e.0),
        Some("DuplicateContentFilter")
    );
}

#[tokio::test]
async fn repost_of_retained_original_is_dropped() {
    let model = TableModel::default().favorite(1, 0.5).favorite(2, 0.5);
    let repost = PostRecord {
        is_repost: true,
        original_post_id: Some(1),
        ..record(2, 11)
    };
    let response = ranker(model)
        .rank(request(vec![record(1, 10), repost]))
        .await
        .unwrap();
    assert_eq!(selected_ids(&response), vec![1]);
}

#[tokio::test]
async fn muted_phrase_matches_whole_tokens_only() {
    let model = (1..=4).fold(TableModel::default(), |m, id| m.favorite(id, 0.5));
    let texts = [
        "Watching the World Cup final tonight",
        "worldcup watch party",
        "a world record cup of coffee",
        "no sports here",
    ];
    let candidates = texts
        .iter()
        .enumerate()
        .map(|(i, text)| PostRecord {
            text: Some(text.to_string()),
            ..record(i as u64 + 1, 10 + i as u64)
        })
        .collect();
    let viewer = ViewerProfile {
        muted_keywords: vec!["world cup".to_string()],
        ..profile()
    };
    let response = ranker_with(RankingConfig::default(), model, viewer)
        .rank(request(candidates))
        .await
        .unwrap();

    let mut ids = selected_ids(&response);
    ids.sort();
    assert_eq!(ids, vec![2, 3, 4]);
    assert_eq!(
        excluded_by(&response, 1).map(|e| e.0),
        Some("MutedKeywordFilter")
    );
}

#[tokio::test]
async fn blocked_muted_seen_and_paywalled_are_filtered() {
    let model = (1..=5).fold(TableModel::default(), |m, id| m.favorite(id, 0.5));
    let viewer = ViewerProfile {
        blocked_user_ids: vec![10],
        muted_user_ids: vec![11],
        seen_post_ids: vec![3],
        ..profile()
    };
    let paywalled = PostRecord {
        paywall_author_id: Some(14),
        ..record(4, 14)
    };
    let candidates = vec![record(1, 10), record(2, 11), record(3, 12), paywalled, record(5, 13)];
    let response = ranker_with(RankingConfig::default(), model, viewer)
        .rank(request(candidates))
        .await
        .unwrap();

    assert_eq!(selected_ids(&response), vec![5]);
    let components: Vec<_> = (1..=4)
        .map(|id| excluded_by(&response, id).map(|e| e.0))
        .collect();
    assert_eq!(
        components,
        vec![
            Some("AuthorSocialgraphFilter"),
            Some("AuthorSocialgraphFilter"),
            Some("PreviouslySeenPostsFilter"),
            Some("IneligibleSubscriptionFilter"),
        ]
    );
}

#[tokio::test]
async fn malformed_records_are_dropped_with_a_diagnostic() {
    let model = TableModel::default().favorite(1, 0.5);
    let no_author = PostRecord {
        author_id: None,
        ..record(2, 10)
    };
    let response = ranker(model)
        .rank(request(vec![record(1, 10), no_author]))
        .await
        .unwrap();

    assert_eq!(selected_ids(&response), vec![1]);
    let diagnostic = response.exclusions.iter().find(|e| e.post_id == 2).unwrap();
    assert_eq!(diagnostic.component, "CoreDataValidationFilter");
    assert!(diagnostic.reason.contains("author_id"));
}

#[tokio::test]
async fn model_failure_excludes_only_that_candidate() {
    let model = TableModel::default().favorite(1, 0.5).favorite(3, 0.4);
    let response = ranker(model)
        .rank(request(vec![record(1, 10), record(2, 11), record(3, 12)]))
        .await
        .unwrap();

    assert_eq!(selected_ids(&response), vec![1, 3]);
    assert_eq!(
        excluded_by(&response, 2),
        Some(("EngagementScorer", CandidateState::Scored))
    );
    assert!(!response.partial);
}

#[tokio::test]
async fn flagged_content_is_removed_after_selection() {
    let model = (1..=3).fold(TableModel::default(), |m, id| m.favorite(id, 0.5));
    let clients = PipelineClients {
        model: Arc::new(model),
        retrieval: None,
        viewer_store: Arc::new(InMemoryViewerStore::new([profile()])),
        visibility: Arc::new(StaticVisibilityClient::new([
            (1, FilteredReason::Spam),
            (2, FilteredReason::Safety(SafetyAction::Label)),
        ])),
    };
    let ranker = FeedRanker::new(RankingConfig::default(), clients).unwrap();
    let response = ranker
        .rank(request(vec![record(1, 10), record(2, 11), record(3, 12)]))
        .await
        .unwrap();

    let mut ids = selected_ids(&response);
    ids.sort();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(
        excluded_by(&response, 1),
        Some(("VFFilter", CandidateState::PostFiltered))
    );
}

#[tokio::test]
async fn visibility_outage_withholds_the_feed() {
    let model = (1..=2).fold(TableModel::default(), |m, id| m.favorite(id, 0.5));
    let clients = PipelineClients {
        model: Arc::new(model),
        retrieval: None,
        viewer_store: Arc::new(InMemoryViewerStore::new([profile()])),
        visibility: Arc::new(UnreachableVisibility),
    };
    let ranker = FeedRanker::new(RankingConfig::default(), clients).unwrap();
    let response = ranker
        .rank(request(vec![record(1, 10), record(2, 11)]))
        .await
        .unwrap();

    assert!(response.selected.is_empty());
    for post_id in [1, 2] {
        let exclusion = response.exclusions.iter().find(|e| e.post_id == post_id).unwrap();
        assert_eq!(exclusion.component, "VFFilter");
        assert_eq!(exclusion.reason, "visibility unknown");
    }
}

#[tokio::test]
async fn unknown_viewer_is_an_error() {
    let model = TableModel::default().favorite(1, 0.5);
    let stranger = ViewerProfile {
        viewer_id: 999,
        ..Default::default()
    };
    let err = ranker_with(RankingConfig::default(), model, stranger)
        .rank(request(vec![record(1, 10)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RankingError::Unavailable {
            component: "ViewerContextQueryHydrator",
            ..
        }
    ));
}

#[tokio::test]
async fn retrieval_sources_feed_the_pipeline() {
    let store = InMemoryPostStore::new(0);
    store.insert_posts(vec![record(1, 10), record(2, 20), record(3, VIEWER)]);
    let model = (1..=3).fold(TableModel::default(), |m, id| m.favorite(id, 0.5));
    let clients = PipelineClients {
        model: Arc::new(model),
        retrieval: Some(Arc::new(store) as Arc<dyn RetrievalClient>),
        viewer_store: Arc::new(InMemoryViewerStore::new([profile()])),
        visibility: Arc::new(StaticVisibilityClient::default()),
    };
    let ranker = FeedRanker::new(RankingConfig::default(), clients).unwrap();

    let response = ranker.rank(request(Vec::new())).await.unwrap();
    let by_id: HashMap<u64, f64> = response
        .selected
        .iter()
        .map(|c| (c.post_id, c.origin_multiplier))
        .collect();
    assert_eq!(by_id.get(&1), Some(&1.0));
    assert_eq!(by_id.get(&2), Some(&0.7));
    assert!(!by_id.contains_key(&3));

    let in_network_only = RankingRequest {
        in_network_only: true,
        ..request(Vec::new())
    };
    let response = ranker.rank(in_network_only).await.unwrap();
    assert_eq!(selected_ids(&response), vec![1]);
}

#[tokio::test]
async fn scoring_is_independent_of_batch_composition() {
    let model = || {
        (1..=3).fold(TableModel::default(), |m, id| m.favorite(id, 0.2 * id as f64))
    };
    let alone = ranker(model())
        .rank(request(vec![record(2, 11)]))
        .await
        .unwrap();
    let batched = ranker(model())
        .rank(request(vec![record(3, 12), record(2, 11), record(1, 10)]))
        .await
        .unwrap();

    let in_batch = batched.selected.iter().find(|c| c.post_id == 2).unwrap();
    assert_eq!(alone.selected[0].raw_score, in_batch.raw_score);
    assert_eq!(alone.selected[0].final_score, in_batch.final_score);
}

#[tokio::test(start_paused = true)]
async fn deadline_after_scoring_returns_partial_feed() {
    let config = RankingConfig {
        scorer_timeout_ms: 60_000,
        ..RankingConfig::default()
    };
    let model = TableModel::default().favorite(1, 0.5).favorite(2, 0.4).stall(3);
    let req = RankingRequest {
        timeout_ms: Some(1_000),
        allow_partial: true,
        ..request(vec![record(1, 10), record(2, 11), record(3, 12)])
    };
    let response = ranker_with(config, model, profile())
        .rank(req)
        .await
        .unwrap();

    assert!(response.partial);
    assert_eq!(selected_ids(&response), vec![1, 2]);
    assert_eq!(
        excluded_by(&response, 3),
        Some(("EngagementScorer", CandidateState::Scored))
    );
}

#[tokio::test(start_paused = true)]
async fn partial_feed_still_drops_flagged_content() {
    let config = RankingConfig {
        scorer_timeout_ms: 60_000,
        ..RankingConfig::default()
    };
    let model = TableModel::default().favorite(1, 0.5).favorite(2, 0.4).stall(3);
    let clients = PipelineClients {
        model: Arc::new(model),
        retrieval: None,
        viewer_store: Arc::new(InMemoryViewerStore::new([profile()])),
        visibility: Arc::new(StaticVisibilityClient::new([(1, FilteredReason::Spam)])),
    };
    let req = RankingRequest {
        timeout_ms: Some(1_000),
        allow_partial: true,
        ..request(vec![record(1, 10), record(2, 11), record(3, 12)])
    };
    let response = FeedRanker::new(config, clients)
        .unwrap()
        .rank(req)
        .await
        .unwrap();

    assert!(response.partial);
    assert_eq!(selected_ids(&response), vec![2]);
    assert_eq!(
        excluded_by(&response, 1),
        Some(("VFFilter", CandidateState::PostFiltered))
    );
}

#[tokio::test(start_paused = true)]
async fn deadline_fails_request_without_partial_tolerance() {
    let config = RankingConfig {
        scorer_timeout_ms: 60_000,
        ..RankingConfig::default()
    };
    let model = TableModel::default().favorite(1, 0.5).stall(3);
    let req = RankingRequest {
        timeout_ms: Some(1_000),
        ..request(vec![record(1, 10), record(3, 12)])
    };
    let err = ranker_with(config, model, profile())
        .rank(req)
        .await
        .unwrap_err();
    assert!(matches!(err, RankingError::Timeout { .. }));
}

#[tokio::test(start_paused = true)]
async fn slow_prediction_times_out_without_failing_request() {
    let model = TableModel::default().favorite(1, 0.5).stall(2);
    let response = ranker(model)
        .rank(request(vec![record(1, 10), record(2, 11)]))
        .await
        .unwrap();

    assert!(!response.partial);
    assert_eq!(selected_ids(&response), vec![1]);
    let timed_out = response.exclusions.iter().find(|e| e.post_id == 2).unwrap();
    assert_eq!(timed_out.reason, "timed out");
}

#[test]
fn incomplete_weight_table_fails_before_any_request() {
    let mut config = RankingConfig::default();
    config.weights.remove("report");
    let clients = PipelineClients {
        model: Arc::new(TableModel::default()),
        retrieval: None,
        viewer_store: Arc::new(InMemoryViewerStore::default()),
        visibility: Arc::new(StaticVisibilityClient::default()),
    };
    assert!(FeedRanker::new(config, clients).is_err());
}
