mod top_k_score_selector;

pub use top_k_score_selector::TopKScoreSelector;
