pub mod content_analyzer_model;
pub mod engagement_model;
pub mod post_store;
pub mod viewer_store;
pub mod visibility_client;
