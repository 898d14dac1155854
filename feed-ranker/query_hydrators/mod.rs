pub mod engagement_history_query_hydrator;
pub mod viewer_context_query_hydrator;
