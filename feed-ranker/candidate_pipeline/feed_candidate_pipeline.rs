use crate::candidate_hydrators::content_hash_hydrator::ContentHashHydrator;
use crate::candidate_hydrators::in_network_candidate_hydrator::InNetworkCandidateHydrator;
use crate::candidate_hydrators::vf_candidate_hydrator::VFCandidateHydrator;
use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::clients::engagement_model::EngagementModel;
use crate::clients::post_store::RetrievalClient;
use crate::clients::viewer_store::ViewerStore;
use crate::clients::visibility_client::VisibilityClient;
use crate::config::RankingConfig;
use crate::error::ConfigError;
use crate::filters::age_filter::AgeFilter;
use crate::filters::author_socialgraph_filter::AuthorSocialgraphFilter;
use crate::filters::core_data_validation_filter::CoreDataValidationFilter;
use crate::filters::dedup_conversation_filter::DedupConversationFilter;
use crate::filters::drop_duplicates_filter::DropDuplicatesFilter;
use crate::filters::duplicate_content_filter::DuplicateContentFilter;
use crate::filters::ineligible_subscription_filter::IneligibleSubscriptionFilter;
use crate::filters::muted_keyword_filter::MutedKeywordFilter;
use crate::filters::previously_seen_posts_filter::PreviouslySeenPostsFilter;
use crate::filters::previously_served_posts_filter::PreviouslyServedPostsFilter;
use crate::filters::reply_eligibility_filter::ReplyEligibilityFilter;
use crate::filters::repost_deduplication_filter::RepostDeduplicationFilter;
use crate::filters::self_post_filter::SelfPostFilter;
use crate::filters::vf_filter::VFFilter;
use crate::query_hydrators::engagement_history_query_hydrator::EngagementHistoryQueryHydrator;
use crate::query_hydrators::viewer_context_query_hydrator::ViewerContextQueryHydrator;
use crate::scorers::author_diversity_scorer::AuthorDiversityScorer;
use crate::scorers::engagement_scorer::EngagementScorer;
use crate::scorers::oon_scorer::OONScorer;
use crate::scorers::weighted_scorer::WeightedScorer;
use crate::selectors::TopKScoreSelector;
use crate::sources::in_network_source::InNetworkSource;
use crate::sources::out_of_network_source::OutOfNetworkSource;
use crate::sources::request_pool_source::RequestPoolSource;
use async_trait::async_trait;
use candidate_pipeline::candidate_pipeline::CandidatePipeline;
use candidate_pipeline::filter::Filter;
use candidate_pipeline::hydrator::Hydrator;
use candidate_pipeline::query_hydrator::QueryHydrator;
use candidate_pipeline::scorer::Scorer;
use candidate_pipeline::selector::Selector;
use candidate_pipeline::source::Source;
use std::sync::Arc;
use std::time::Duration;

/// Collaborators the pipeline calls out to.
#[derive(Clone)]
pub struct PipelineClients {
    pub model: Arc<dyn EngagementModel>,
    /// Without a retrieval client only the request's own candidate pool is ranked.
    pub retrieval: Option<Arc<dyn RetrievalClient>>,
    pub viewer_store: Arc<dyn ViewerStore>,
    pub visibility: Arc<dyn VisibilityClient>,
}

pub struct FeedCandidatePipeline {
    query_hydrators: Vec<Box<dyn QueryHydrator<ScoredPostsQuery>>>,
    sources: Vec<Box<dyn Source<ScoredPostsQuery, PostCandidate>>>,
    hydrators: Vec<Box<dyn Hydrator<ScoredPostsQuery, PostCandidate>>>,
    filters: Vec<Box<dyn Filter<ScoredPostsQuery, PostCandidate>>>,
    scorers: Vec<Box<dyn Scorer<ScoredPostsQuery, PostCandidate>>>,
    selector: TopKScoreSelector,
    post_selection_hydrators: Vec<Box<dyn Hydrator<ScoredPostsQuery, PostCandidate>>>,
    post_selection_filters: Vec<Box<dyn Filter<ScoredPostsQuery, PostCandidate>>>,
}

impl FeedCandidatePipeline {
    /// Wires every stage from a validated config. Nothing is built when the
    /// config is rejected.
    pub fn build_with_clients(
        config: &RankingConfig,
        clients: PipelineClients,
    ) -> Result<FeedCandidatePipeline, ConfigError> {
        config.validate()?;
        let weights = config.weight_table()?;

        // Query Hydrators
        let query_hydrators: Vec<Box<dyn QueryHydrator<ScoredPostsQuery>>> = vec![
            Box::new(ViewerContextQueryHydrator {
                viewer_store: clients.viewer_store.clone(),
                seen_set: config.seen_set.clone(),
            }),
            Box::new(EngagementHistoryQueryHydrator {
                viewer_store: clients.viewer_store,
                depth: config.engagement_history_depth,
            }),
        ];

        // Sources
        let mut sources: Vec<Box<dyn Source<ScoredPostsQuery, PostCandidate>>> =
            vec![Box::new(RequestPoolSource)];
        if let Some(retrieval_client) = clients.retrieval {
            sources.push(Box::new(InNetworkSource {
                retrieval_client: retrieval_client.clone(),
                max_results: config.in_network_max_results,
            }));
            sources.push(Box::new(OutOfNetworkSource {
                retrieval_client,
                max_results: config.oon_max_results,
            }));
        }

        // Hydrators
        let hydrators: Vec<Box<dyn Hydrator<ScoredPostsQuery, PostCandidate>>> = vec![
            Box::new(InNetworkCandidateHydrator),
            Box::new(ContentHashHydrator),
        ];

        // Filters
        let filters: Vec<Box<dyn Filter<ScoredPostsQuery, PostCandidate>>> = vec![
            Box::new(CoreDataValidationFilter),
            Box::new(DropDuplicatesFilter),
            Box::new(SelfPostFilter),
            Box::new(DuplicateContentFilter),
            Box::new(RepostDeduplicationFilter),
            Box::new(AgeFilter::new(Duration::from_secs(config.max_age_secs))),
            Box::new(AuthorSocialgraphFilter),
            Box::new(MutedKeywordFilter),
            Box::new(PreviouslySeenPostsFilter),
            Box::new(PreviouslyServedPostsFilter),
            Box::new(IneligibleSubscriptionFilter),
        ];

        // Scorers
        let scorers: Vec<Box<dyn Scorer<ScoredPostsQuery, PostCandidate>>> = vec![
            Box::new(EngagementScorer {
                model: clients.model,
                timeout: Duration::from_millis(config.scorer_timeout_ms),
            }),
            Box::new(WeightedScorer { weights }),
            Box::new(AuthorDiversityScorer::new(
                config.diversity_base,
                config.diversity_floor,
            )),
            Box::new(OONScorer {
                factor: config.oon_factor,
            }),
        ];

        // Selector
        let selector = TopKScoreSelector;

        // Post-selection hydrators
        let post_selection_hydrators: Vec<Box<dyn Hydrator<ScoredPostsQuery, PostCandidate>>> =
            vec![Box::new(VFCandidateHydrator::new(clients.visibility))];

        // Post-selection filters
        let post_selection_filters: Vec<Box<dyn Filter<ScoredPostsQuery, PostCandidate>>> = vec![
            Box::new(VFFilter),
            Box::new(ReplyEligibilityFilter),
            Box::new(DedupConversationFilter),
        ];

        Ok(FeedCandidatePipeline {
            query_hydrators,
            sources,
            hydrators,
            filters,
            scorers,
            selector,
            post_selection_hydrators,
            post_selection_filters,
        })
    }
}

#[async_trait]
impl CandidatePipeline<ScoredPostsQuery, PostCandidate> for FeedCandidatePipeline {
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<ScoredPostsQuery>>] {
        &self.query_hydrators
    }

    fn sources(&self) -> &[Box<dyn Source<ScoredPostsQuery, PostCandidate>>] {
        &self.sources
    }
    fn hydrators(&self) -> &[Box<dyn Hydrator<ScoredPostsQuery, PostCandidate>>] {
        &self.hydrators
    }

    fn filters(&self) -> &[Box<dyn Filter<ScoredPostsQuery, PostCandidate>>] {
        &self.filters
    }

    fn scorers(&self) -> &[Box<dyn Scorer<ScoredPostsQuery, PostCandidate>>] {
        &self.scorers
    }

    fn selector(&self) -> &dyn Selector<ScoredPostsQuery, PostCandidate> {
        &self.selector
    }

    fn post_selection_hydrators(&self) -> &[Box<dyn Hydrator<ScoredPostsQuery, PostCandidate>>] {
        &self.post_selection_hydrators
    }

    fn post_selection_filters(&self) -> &[Box<dyn Filter<ScoredPostsQuery, PostCandidate>>] {
        &self.post_selection_filters
    }

    fn result_size(&self, query: &ScoredPostsQuery) -> usize {
        query.result_size
    }
}
