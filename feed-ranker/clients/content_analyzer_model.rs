use async_trait::async_trait;

use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query_features::{EngagementEvent, ViewerContext};
use crate::candidate_pipeline::signals::{Polarity, Signal, SignalVector, SIGNAL_COUNT};
use crate::clients::engagement_model::{EngagementModel, ModelError};

const QUESTION_MARKERS: &[&str] = &["?", "what do you think", "thoughts?", "agree?"];
const CALL_TO_ACTION: &[&str] = &["retweet", "rt if", "share", "like if", "follow"];
const CONTROVERSY_MARKERS: &[&str] = &["hot take", "unpopular opinion", "controversial"];
const POSITIVE_MARKERS: &[&str] = &["amazing", "incredible", "love", "best", "great"];
const NEGATIVE_MARKERS: &[&str] = &["hate", "worst", "terrible", "fight me", "argue"];
const IMAGE_MARKERS: &[&str] = &["📷", "🖼️", "photo", "image"];
const VIDEO_MARKERS: &[&str] = &["video", "📹", "🎥", "watch"];

/// Cap on how many past engagements with one author count toward affinity.
const MAX_AFFINITY_EVENTS: usize = 5;
const AFFINITY_STEP: f64 = 0.02;

/// Text heuristics standing in for a learned model.
///
/// Starts from fixed base rates, bumps channels on textual markers, then
/// shifts toward the viewer's history with the author: past positive
/// engagement raises favorite and profile-click odds, past negative feedback
/// raises the matching negative channels.
#[derive(Clone, Debug, Default)]
pub struct ContentAnalyzerModel;

impl ContentAnalyzerModel {
    pub fn analyze(
        &self,
        text: &str,
        author_id: u64,
        viewer: &ViewerContext,
        history: &[EngagementEvent],
    ) -> Result<SignalVector, ModelError> {
        let text = text.to_lowercase();
        let word_count = text.split_whitespace().count();
        let mut p = [0.0; SIGNAL_COUNT];
        let mut add = |signal: Signal, delta: f64| p[signal.index()] += delta;

        add(Signal::Favorite, 0.3);
        add(Signal::Reply, 0.15);
        add(Signal::Repost, 0.08);
        add(Signal::Quote, 0.04);
        add(Signal::ProfileClick, 0.12);
        add(Signal::Share, 0.05);
        add(Signal::ShareViaDm, 0.02);
        add(Signal::Dwell, 0.25);

        if contains_any(&text, QUESTION_MARKERS) {
            add(Signal::Reply, 0.15);
        }
        if contains_any(&text, CALL_TO_ACTION) {
            add(Signal::Repost, 0.1);
            add(Signal::Share, 0.05);
        }

        let positive = count_matches(&text, POSITIVE_MARKERS);
        add(Signal::Favorite, (positive as f64 * 0.05).min(0.2));

        if contains_any(&text, CONTROVERSY_MARKERS) {
            add(Signal::Reply, 0.1);
            add(Signal::Quote, 0.08);
            add(Signal::NotInterested, 0.05);
            add(Signal::MuteAuthor, 0.02);
        }

        let negative = count_matches(&text, NEGATIVE_MARKERS) as f64;
        if negative > 0.0 {
            add(Signal::BlockAuthor, (negative * 0.02).min(0.05));
            add(Signal::MuteAuthor, (negative * 0.03).min(0.08));
            add(Signal::NotInterested, (negative * 0.05).min(0.15));
        }

        if contains_any(&text, IMAGE_MARKERS) {
            add(Signal::PhotoExpand, 0.15);
        }
        if contains_any(&text, VIDEO_MARKERS) {
            add(Signal::VideoQualityView, 0.35);
        }

        if word_count > 50 {
            add(Signal::Dwell, 0.15);
        } else if word_count < 10 {
            add(Signal::Dwell, -0.1);
        }

        let (liked, disliked) = author_affinity(author_id, history);
        add(Signal::Favorite, liked);
        add(Signal::ProfileClick, liked);
        add(Signal::NotInterested, disliked);
        add(Signal::MuteAuthor, disliked);
        if !viewer.follows(author_id) {
            add(Signal::FollowAuthor, liked);
        }

        for value in p.iter_mut() {
            *value = value.clamp(0.0, 1.0);
        }
        SignalVector::from_values(p).map_err(ModelError::from)
    }
}

#[async_trait]
impl EngagementModel for ContentAnalyzerModel {
    async fn predict(
        &self,
        candidate: &PostCandidate,
        viewer: &ViewerContext,
        history: &[EngagementEvent],
    ) -> Result<SignalVector, ModelError> {
        self.analyze(&candidate.text, candidate.author_id, viewer, history)
    }
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}

fn count_matches(text: &str, markers: &[&str]) -> usize {
    markers.iter().filter(|m| text.contains(*m)).count()
}

fn author_affinity(author_id: u64, history: &[EngagementEvent]) -> (f64, f64) {
    let (mut liked, mut disliked) = (0usize, 0usize);
    for event in history.iter().filter(|e| e.author_id == author_id) {
        match event.action.polarity() {
            Polarity::Positive => liked += 1,
            Polarity::Negative => disliked += 1,
        }
    }
    (
        liked.min(MAX_AFFINITY_EVENTS) as f64 * AFFINITY_STEP,
        disliked.min(MAX_AFFINITY_EVENTS) as f64 * AFFINITY_STEP,
    )
}
