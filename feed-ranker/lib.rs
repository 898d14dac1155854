mod candidate_hydrators;
pub mod candidate_pipeline;
pub mod clients;
pub mod config;
pub mod error;
mod filters;
pub mod params;
mod query_hydrators;
mod ranker;
pub mod scorers;
mod selectors;
mod sources;
#[cfg(test)]
mod test_util;
pub mod util;

pub use ranker::{
    CandidateState, ExclusionRecord, FeedRanker, RankingRequest, RankingResponse,
    SelectedCandidate,
};
