pub mod author_diversity_scorer;
pub mod engagement_scorer;
pub mod oon_scorer;
pub mod weighted_scorer;
