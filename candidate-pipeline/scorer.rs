use crate::error::StageError;
use crate::util;
use async_trait::async_trait;
use std::any::type_name_of_val;

/// Outcome of scoring one candidate. `Err` excludes that candidate only.
pub type CandidateScore<C> = Result<C, StageError>;

/// Scorers run sequentially; each sees the fields written by the ones before it.
#[async_trait]
pub trait Scorer<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Score every candidate.
    ///
    /// The returned vector must line up with `candidates` (same length, same
    /// order). Per-candidate failures go in the inner `Result`; an outer `Err`
    /// means the scorer as a whole failed and leaves candidates untouched.
    async fn score(
        &self,
        query: &Q,
        candidates: &[C],
    ) -> Result<Vec<CandidateScore<C>>, StageError>;

    /// Copy only the fields owned by this scorer from `scored`.
    fn update(&self, candidate: &mut C, scored: C);

    fn name(&self) -> &'static str {
        util::short_type_name(type_name_of_val(self))
    }
}
