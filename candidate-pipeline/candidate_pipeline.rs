use crate::error::PipelineError;
use crate::filter::Filter;
use crate::hydrator::Hydrator;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::source::Source;
use async_trait::async_trait;
use futures::future::join_all;
use log::{error, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    QueryHydrator,
    Source,
    Hydrator,
    Filter,
    Scorer,
    Selector,
    PostSelectionHydrator,
    PostSelectionFilter,
}

/// A candidate that left the run before selection.
#[derive(Clone, Debug)]
pub struct Exclusion<C> {
    pub candidate: C,
    pub stage: PipelineStage,
    pub component: &'static str,
    pub reason: String,
}

pub struct PipelineResult<Q, C> {
    pub retrieved_candidates: Vec<C>,
    pub excluded: Vec<Exclusion<C>>,
    pub selected_candidates: Vec<C>,
    pub query: Q,
    /// The deadline passed after scoring and later stages were cut short.
    pub partial: bool,
}

/// Provides a stable request identifier for logging/tracing.
pub trait HasRequestId {
    fn request_id(&self) -> &str;
}

/// Request-level time budget.
pub trait HasDeadline {
    fn deadline(&self) -> Option<Instant>;

    /// Whether the caller accepts a partial result once scoring has completed.
    fn allow_partial(&self) -> bool {
        false
    }

    /// Budget for post-selection hydration once the deadline has already
    /// passed on a partial run. Candidates it could not hydrate still go
    /// through the post-selection filters.
    fn post_selection_grace(&self) -> Duration {
        Duration::ZERO
    }
}

async fn run_until<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

#[async_trait]
pub trait CandidatePipeline<Q, C>: Send + Sync
where
    Q: HasRequestId + HasDeadline + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<Q>>];
    fn sources(&self) -> &[Box<dyn Source<Q, C>>];
    fn hydrators(&self) -> &[Box<dyn Hydrator<Q, C>>];
    fn filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn scorers(&self) -> &[Box<dyn Scorer<Q, C>>];
    fn selector(&self) -> &dyn Selector<Q, C>;
    fn post_selection_hydrators(&self) -> &[Box<dyn Hydrator<Q, C>>];
    fn post_selection_filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn result_size(&self, query: &Q) -> usize;

    /// Runs every stage in order. Stages before scoring fail the run when the
    /// deadline passes; after scoring the run degrades to a partial result if
    /// the query allows it.
    async fn execute(&self, query: Q) -> Result<PipelineResult<Q, C>, PipelineError> {
        let request_id = query.request_id().to_string();
        let deadline = query.deadline();
        let allow_partial = query.allow_partial();
        let timed_out = |stage: PipelineStage| PipelineError::DeadlineExceeded {
            request_id: request_id.clone(),
            stage,
        };

        let hydrated_query = run_until(deadline, self.hydrate_query(query))
            .await
            .ok_or_else(|| timed_out(PipelineStage::QueryHydrator))??;

        let candidates = run_until(deadline, self.fetch_candidates(&hydrated_query))
            .await
            .ok_or_else(|| timed_out(PipelineStage::Source))?;

        let hydrated_candidates = run_until(deadline, self.hydrate(&hydrated_query, candidates))
            .await
            .ok_or_else(|| timed_out(PipelineStage::Hydrator))?;

        let (kept_candidates, mut excluded) = self
            .filter(&hydrated_query, hydrated_candidates.clone())
            .await;
        if deadline_passed(deadline) {
            return Err(timed_out(PipelineStage::Filter));
        }

        let (scored_candidates, scoring_exclusions) =
            run_until(deadline, self.score(&hydrated_query, kept_candidates))
                .await
                .ok_or_else(|| timed_out(PipelineStage::Scorer))?;
        excluded.extend(scoring_exclusions);

        let mut partial = false;
        if deadline_passed(deadline) {
            if scored_candidates.is_empty() || !allow_partial {
                return Err(timed_out(PipelineStage::Scorer));
            }
            partial = true;
        }

        let selected_candidates = self.select(&hydrated_query, scored_candidates);

        // A partial run still hydrates, on its own budget, so the
        // post-selection filters see what they need.
        let hydration_deadline = if partial {
            Some(Instant::now() + hydrated_query.post_selection_grace())
        } else {
            deadline
        };
        let hydration = self.hydrate_post_selection(&hydrated_query, selected_candidates.clone());
        let post_selection_hydrated_candidates = match run_until(hydration_deadline, hydration).await {
            Some(hydrated) => hydrated,
            None if allow_partial => {
                warn!(
                    "request_id={} stage={:?} deadline exceeded, continuing with unhydrated candidates",
                    request_id,
                    PipelineStage::PostSelectionHydrator
                );
                partial = true;
                selected_candidates
            }
            None => return Err(timed_out(PipelineStage::PostSelectionHydrator)),
        };

        let (mut final_candidates, post_selection_exclusions) = self
            .filter_post_selection(&hydrated_query, post_selection_hydrated_candidates)
            .await;
        excluded.extend(post_selection_exclusions);

        final_candidates.truncate(self.result_size(&hydrated_query));

        info!(
            "request_id={} retrieved {}, excluded {}, selected {}{}",
            request_id,
            hydrated_candidates.len(),
            excluded.len(),
            final_candidates.len(),
            if partial { " (partial)" } else { "" }
        );

        Ok(PipelineResult {
            retrieved_candidates: hydrated_candidates,
            excluded,
            selected_candidates: final_candidates,
            query: hydrated_query,
            partial,
        })
    }

    /// Run all query hydrators in parallel and merge results into the query.
    /// A failed optional hydrator leaves its fields untouched; a failed
    /// required one fails the run.
    async fn hydrate_query(&self, query: Q) -> Result<Q, PipelineError> {
        let request_id = query.request_id().to_string();
        let hydrators: Vec<_> = self
            .query_hydrators()
            .iter()
            .filter(|h| h.enable(&query))
            .collect();
        let hydrate_futures = hydrators.iter().map(|h| h.hydrate(&query));
        let results = join_all(hydrate_futures).await;

        let mut hydrated_query = query;
        for (hydrator, result) in hydrators.iter().zip(results) {
            match result {
                Ok(hydrated) => {
                    hydrator.update(&mut hydrated_query, hydrated);
                }
                Err(err) => {
                    error!(
                        "request_id={} stage={:?} component={} failed: {}",
                        request_id,
                        PipelineStage::QueryHydrator,
                        hydrator.name(),
                        err
                    );
                    if hydrator.required() {
                        return Err(PipelineError::QueryHydrationFailed {
                            request_id,
                            component: hydrator.name(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }
        Ok(hydrated_query)
    }

    /// Run all candidate sources in parallel and concatenate results in source order.
    async fn fetch_candidates(&self, query: &Q) -> Vec<C> {
        let request_id = query.request_id().to_string();
        let sources: Vec<_> = self.sources().iter().filter(|s| s.enable(query)).collect();
        let source_futures = sources.iter().map(|s| s.get_candidates(query));
        let results = join_all(source_futures).await;

        let mut collected = Vec::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(mut candidates) => {
                    info!(
                        "request_id={} stage={:?} component={} fetched {} candidates",
                        request_id,
                        PipelineStage::Source,
                        source.name(),
                        candidates.len()
                    );
                    collected.append(&mut candidates);
                }
                Err(err) => {
                    error!(
                        "request_id={} stage={:?} component={} failed, contributing no candidates: {}",
                        request_id,
                        PipelineStage::Source,
                        source.name(),
                        err
                    );
                }
            }
        }
        collected
    }

    async fn hydrate(&self, query: &Q, candidates: Vec<C>) -> Vec<C> {
        self.run_hydrators(query, candidates, self.hydrators(), PipelineStage::Hydrator)
            .await
    }

    async fn hydrate_post_selection(&self, query: &Q, candidates: Vec<C>) -> Vec<C> {
        self.run_hydrators(
            query,
            candidates,
            self.post_selection_hydrators(),
            PipelineStage::PostSelectionHydrator,
        )
        .await
    }

    /// Shared helper to hydrate with a provided hydrator list.
    async fn run_hydrators(
        &self,
        query: &Q,
        mut candidates: Vec<C>,
        hydrators: &[Box<dyn Hydrator<Q, C>>],
        stage: PipelineStage,
    ) -> Vec<C> {
        let request_id = query.request_id().to_string();
        let hydrators: Vec<_> = hydrators.iter().filter(|h| h.enable(query)).collect();
        let expected_len = candidates.len();
        let hydrate_futures = hydrators.iter().map(|h| h.hydrate(query, &candidates));
        let results = join_all(hydrate_futures).await;
        for (hydrator, result) in hydrators.iter().zip(results) {
            match result {
                Ok(hydrated) if hydrated.len() == expected_len => {
                    hydrator.update_all(&mut candidates, hydrated);
                }
                Ok(hydrated) => {
                    warn!(
                        "request_id={} stage={:?} component={} returned {} results for {} candidates, ignored",
                        request_id,
                        stage,
                        hydrator.name(),
                        hydrated.len(),
                        expected_len
                    );
                }
                Err(err) => {
                    error!(
                        "request_id={} stage={:?} component={} failed, fields left unset: {}",
                        request_id,
                        stage,
                        hydrator.name(),
                        err
                    );
                }
            }
        }
        candidates
    }

    async fn filter(&self, query: &Q, candidates: Vec<C>) -> (Vec<C>, Vec<Exclusion<C>>) {
        self.run_filters(query, candidates, self.filters(), PipelineStage::Filter)
            .await
    }

    async fn filter_post_selection(
        &self,
        query: &Q,
        candidates: Vec<C>,
    ) -> (Vec<C>, Vec<Exclusion<C>>) {
        self.run_filters(
            query,
            candidates,
            self.post_selection_filters(),
            PipelineStage::PostSelectionFilter,
        )
        .await
    }

    // A failing filter is skipped: its input passes through unchanged.
    async fn run_filters(
        &self,
        query: &Q,
        mut candidates: Vec<C>,
        filters: &[Box<dyn Filter<Q, C>>],
        stage: PipelineStage,
    ) -> (Vec<C>, Vec<Exclusion<C>>) {
        let request_id = query.request_id().to_string();
        let mut exclusions = Vec::new();
        for filter in filters.iter().filter(|f| f.enable(query)) {
            let backup = candidates.clone();
            match filter.filter(query, candidates).await {
                Ok(result) => {
                    candidates = result.kept;
                    exclusions.extend(result.removed.into_iter().map(|candidate| Exclusion {
                        reason: filter.removal_reason(&candidate),
                        candidate,
                        stage,
                        component: filter.name(),
                    }));
                }
                Err(err) => {
                    error!(
                        "request_id={} stage={:?} component={} failed: {}",
                        request_id,
                        stage,
                        filter.name(),
                        err
                    );
                    candidates = backup;
                }
            }
        }
        info!(
            "request_id={} stage={:?} kept {}, removed {}",
            request_id,
            stage,
            candidates.len(),
            exclusions.len()
        );
        (candidates, exclusions)
    }

    /// Run all scorers sequentially. A candidate whose score fails is moved to
    /// the exclusions and skipped by later scorers.
    async fn score(&self, query: &Q, mut candidates: Vec<C>) -> (Vec<C>, Vec<Exclusion<C>>) {
        let request_id = query.request_id().to_string();
        let mut exclusions = Vec::new();
        for scorer in self.scorers().iter().filter(|s| s.enable(query)) {
            let expected_len = candidates.len();
            match scorer.score(query, &candidates).await {
                Ok(scored) if scored.len() == expected_len => {
                    let mut kept = Vec::with_capacity(expected_len);
                    for (mut candidate, outcome) in candidates.into_iter().zip(scored) {
                        match outcome {
                            Ok(fields) => {
                                scorer.update(&mut candidate, fields);
                                kept.push(candidate);
                            }
                            Err(err) => exclusions.push(Exclusion {
                                candidate,
                                stage: PipelineStage::Scorer,
                                component: scorer.name(),
                                reason: err.to_string(),
                            }),
                        }
                    }
                    candidates = kept;
                }
                Ok(scored) => {
                    warn!(
                        "request_id={} stage={:?} component={} skipped: length_mismatch expected={} got={}",
                        request_id,
                        PipelineStage::Scorer,
                        scorer.name(),
                        expected_len,
                        scored.len()
                    );
                }
                Err(err) => {
                    error!(
                        "request_id={} stage={:?} component={} failed: {}",
                        request_id,
                        PipelineStage::Scorer,
                        scorer.name(),
                        err
                    );
                }
            }
        }
        if !exclusions.is_empty() {
            warn!(
                "request_id={} stage={:?} excluded {} candidates on scoring failure",
                request_id,
                PipelineStage::Scorer,
                exclusions.len()
            );
        }
        (candidates, exclusions)
    }

    /// Select (sort/truncate) candidates using the configured selector
    fn select(&self, query: &Q, candidates: Vec<C>) -> Vec<C> {
        if self.selector().enable(query) {
            self.selector().select(query, candidates)
        } else {
            candidates
        }
    }
}
