pub mod candidate_pipeline;
pub mod error;
pub mod filter;
pub mod hydrator;
pub mod query_hydrator;
pub mod scorer;
pub mod selector;
pub mod source;
mod util;

pub use error::{PipelineError, StageError};
