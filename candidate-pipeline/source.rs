use async_trait::async_trait;
use std::any::{Any, type_name_of_val};

use crate::error::StageError;
use crate::util;

/// A retrieval pool. Enabled sources are queried concurrently and their
/// results concatenated in source order, which becomes the batch's retrieval order.
#[async_trait]
pub trait Source<Q, C>: Any + Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn get_candidates(&self, query: &Q) -> Result<Vec<C>, StageError>;

    fn name(&self) -> &'static str {
        util::short_type_name(type_name_of_val(self))
    }
}
