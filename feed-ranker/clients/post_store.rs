use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::candidate_pipeline::candidate::PostRecord;
use crate::candidate_pipeline::query_features::{EngagementEvent, ViewerContext};

/// Retrieval pools feeding the ranker.
#[async_trait]
pub trait RetrievalClient: Send + Sync {
    /// Recent posts by accounts the viewer follows.
    async fn in_network_posts(
        &self,
        viewer: &ViewerContext,
        max_results: usize,
    ) -> anyhow::Result<Vec<PostRecord>>;

    /// Recent posts by accounts the viewer does not follow.
    async fn out_of_network_posts(
        &self,
        viewer: &ViewerContext,
        history: &[EngagementEvent],
        max_results: usize,
    ) -> anyhow::Result<Vec<PostRecord>>;
}

/// Post id and creation time, as kept in per-author timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimelineEntry {
    post_id: u64,
    created_at_ms: i64,
}

/// Thread-safe in-memory post store with one timeline per author.
#[derive(Clone, Default)]
pub struct InMemoryPostStore {
    posts: Arc<DashMap<u64, PostRecord>>,
    posts_by_author: Arc<DashMap<u64, VecDeque<TimelineEntry>>>,
    deleted_posts: Arc<DashMap<u64, ()>>,
    max_posts_per_author: usize,
}

impl InMemoryPostStore {
    pub fn new(max_posts_per_author: usize) -> Self {
        Self {
            max_posts_per_author,
            ..Default::default()
        }
    }

    /// Records without a post id, author or creation time are ignored, as are
    /// ids already stored or deleted.
    pub fn insert_posts(&self, mut posts: Vec<PostRecord>) {
        posts.sort_by_key(|p| p.created_at_ms);
        for post in posts {
            let (Some(post_id), Some(author_id), Some(created_at_ms)) =
                (post.post_id, post.author_id, post.created_at_ms)
            else {
                debug!("post store skipping incomplete record {:?}", post.post_id);
                continue;
            };
            if self.deleted_posts.contains_key(&post_id) || self.posts.contains_key(&post_id) {
                continue;
            }
            self.posts.insert(post_id, post);

            let mut timeline = self.posts_by_author.entry(author_id).or_default();
            timeline.push_back(TimelineEntry {
                post_id,
                created_at_ms,
            });
            if self.max_posts_per_author > 0 && timeline.len() > self.max_posts_per_author {
                if let Some(evicted) = timeline.pop_front() {
                    self.posts.remove(&evicted.post_id);
                }
            }
        }
    }

    pub fn mark_as_deleted(&self, post_ids: &[u64]) {
        for post_id in post_ids {
            self.posts.remove(post_id);
            self.deleted_posts.insert(*post_id, ());
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Newest first across the given authors, ties broken by post id.
    fn posts_by_authors(&self, authors: impl Iterator<Item = u64>, max_results: usize) -> Vec<PostRecord> {
        let mut entries: Vec<TimelineEntry> = authors
            .filter_map(|author_id| self.posts_by_author.get(&author_id))
            .flat_map(|timeline| timeline.value().iter().copied().collect::<Vec<_>>())
            .collect();
        entries.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then(b.post_id.cmp(&a.post_id))
        });

        entries
            .into_iter()
            .filter_map(|entry| self.posts.get(&entry.post_id).map(|p| p.value().clone()))
            .take(max_results)
            .collect()
    }
}

#[async_trait]
impl RetrievalClient for InMemoryPostStore {
    async fn in_network_posts(
        &self,
        viewer: &ViewerContext,
        max_results: usize,
    ) -> anyhow::Result<Vec<PostRecord>> {
        Ok(self.posts_by_authors(viewer.following.iter().copied(), max_results))
    }

    /// Authors the viewer recently engaged with come first, then everyone else.
    async fn out_of_network_posts(
        &self,
        viewer: &ViewerContext,
        history: &[EngagementEvent],
        max_results: usize,
    ) -> anyhow::Result<Vec<PostRecord>> {
        let eligible = |author_id: &u64| {
            *author_id != viewer.viewer_id && !viewer.following.contains(author_id)
        };

        let mut engaged_authors = Vec::new();
        let mut seen_authors = HashSet::new();
        for event in history.iter().rev() {
            if eligible(&event.author_id) && seen_authors.insert(event.author_id) {
                engaged_authors.push(event.author_id);
            }
        }

        let mut posts = self.posts_by_authors(engaged_authors.into_iter(), max_results);
        if posts.len() < max_results {
            let mut remaining_authors: Vec<u64> = self
                .posts_by_author
                .iter()
                .map(|entry| *entry.key())
                .filter(|author_id| eligible(author_id) && !seen_authors.contains(author_id))
                .collect();
            remaining_authors.sort_unstable();
            posts.extend(self.posts_by_authors(remaining_authors.into_iter(), max_results - posts.len()));
        }
        Ok(posts)
    }
}
