pub mod candidate;
pub mod feed_candidate_pipeline;
pub mod query;
pub mod query_features;
pub mod signals;
