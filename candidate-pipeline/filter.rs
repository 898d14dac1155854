use async_trait::async_trait;
use std::any::{Any, type_name_of_val};

use crate::error::StageError;
use crate::util;

pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

impl<C> FilterResult<C> {
    /// Keeps every candidate.
    pub fn pass_through(candidates: Vec<C>) -> Self {
        Self {
            kept: candidates,
            removed: Vec::new(),
        }
    }
}

/// Filters run one after another, each seeing only what the previous one kept.
///
/// Sequential execution is what lets a filter own batch-scoped registries
/// (seen hashes, best-per-thread maps) without locking.
#[async_trait]
pub trait Filter<Q, C>: Any + Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Partition `candidates` into kept and removed. Kept candidates must stay
    /// in their input order.
    ///
    /// On `Err` the orchestrator restores the input unchanged.
    async fn filter(&self, query: &Q, candidates: Vec<C>) -> Result<FilterResult<C>, StageError>;

    /// Reason recorded against a candidate this filter removed.
    fn removal_reason(&self, _candidate: &C) -> String {
        self.name().to_string()
    }

    fn name(&self) -> &'static str {
        util::short_type_name(type_name_of_val(self))
    }
}
