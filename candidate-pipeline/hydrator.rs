use crate::error::StageError;
use crate::util;
use async_trait::async_trait;
use std::any::{Any, type_name_of_val};

/// Populates candidate fields from an external collaborator. All hydrators of
/// one stage run concurrently against the same input.
#[async_trait]
pub trait Hydrator<Q, C>: Any + Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Returns one partially-filled candidate per input candidate, same order.
    /// A result of the wrong length is discarded by the orchestrator, so a
    /// hydrator cannot drop candidates; that is a filter's job.
    async fn hydrate(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, StageError>;

    /// Copy only the fields owned by this hydrator from `hydrated`.
    fn update(&self, candidate: &mut C, hydrated: C);

    fn update_all(&self, candidates: &mut [C], hydrated: Vec<C>) {
        for (candidate, fields) in candidates.iter_mut().zip(hydrated) {
            self.update(candidate, fields);
        }
    }

    fn name(&self) -> &'static str {
        util::short_type_name(type_name_of_val(self))
    }
}
