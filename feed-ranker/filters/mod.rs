pub mod age_filter;
pub mod author_socialgraph_filter;
pub mod core_data_validation_filter;
pub mod dedup_conversation_filter;
pub mod drop_duplicates_filter;
pub mod duplicate_content_filter;
pub mod ineligible_subscription_filter;
pub mod muted_keyword_filter;
pub mod previously_seen_posts_filter;
pub mod previously_served_posts_filter;
pub mod reply_eligibility_filter;
pub mod repost_deduplication_filter;
pub mod self_post_filter;
pub mod vf_filter;
