use async_trait::async_trait;
use std::any::{Any, type_name_of_val};

use crate::error::StageError;
use crate::util;

/// Loads request-scoped state (viewer profile, history) into the query before
/// any candidate is retrieved. Query hydrators run concurrently.
#[async_trait]
pub trait QueryHydrator<Q>: Any + Send + Sync
where
    Q: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Whether a failure must fail the run rather than be logged and skipped.
    fn required(&self) -> bool {
        false
    }

    /// Returns a query carrying only the fields this hydrator owns.
    async fn hydrate(&self, query: &Q) -> Result<Q, StageError>;

    fn update(&self, query: &mut Q, hydrated: Q);

    fn name(&self) -> &'static str {
        util::short_type_name(type_name_of_val(self))
    }
}
