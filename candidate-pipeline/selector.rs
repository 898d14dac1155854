use crate::util;
use std::any::type_name_of_val;
use std::cmp::Ordering;

pub trait Selector<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Default selection: sort and truncate based on provided configs
    fn select(&self, _query: &Q, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = self.sort(candidates);
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        sorted
    }

    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Extract the score from a candidate to use for sorting.
    fn score(&self, candidate: &C) -> f64;

    /// Ordering used by `sort`; `Less` means `a` ranks ahead of `b`.
    /// Override to add tie-breaks.
    fn compare(&self, a: &C, b: &C) -> Ordering {
        self.score(b)
            .partial_cmp(&self.score(a))
            .unwrap_or(Ordering::Equal)
    }

    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| self.compare(a, b));
        sorted
    }

    /// Optional cap applied by `select`. Defaults to no truncation.
    fn size(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &'static str {
        util::short_type_name(type_name_of_val(self))
    }
}
