//! Ranking configuration.
//!
//! Loaded from TOML and validated once, before any request is served. A file
//! must set every field; nothing falls back to a default. Without a file the
//! ranker runs on [`RankingConfig::default`], built from [`crate::params`].
//!
//! ```toml
//! oon_factor = 0.7
//! diversity_base = 0.45
//! diversity_floor = 0.1
//! max_age_secs = 172800
//! # ... remaining scalars
//!
//! [weights]
//! favorite = 1.0
//! reply = 0.8
//! # ... every channel must be listed
//!
//! [seen_set]
//! expected_items = 10000
//! false_positive_rate = 0.01
//! recent_capacity = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::candidate_pipeline::signals::{Polarity, Signal, SIGNAL_COUNT};
use crate::error::ConfigError;
use crate::params as p;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RankingConfig {
    pub oon_factor: f64,
    pub diversity_base: f64,
    pub diversity_floor: f64,
    pub max_age_secs: u64,
    pub engagement_history_depth: usize,
    pub scorer_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Zero leaves no time for visibility checks on a partial feed, so all
    /// of it is withheld.
    pub visibility_grace_ms: u64,
    pub default_result_size: usize,
    pub max_result_size: usize,
    pub in_network_max_results: usize,
    pub oon_max_results: usize,
    /// Channel name to weight. Negative channels are subtracted by magnitude
    /// whatever sign is stored here.
    pub weights: BTreeMap<String, f64>,
    pub seen_set: SeenSetConfig,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            oon_factor: p::OON_WEIGHT_FACTOR,
            diversity_base: p::AUTHOR_DIVERSITY_DECAY,
            diversity_floor: p::AUTHOR_DIVERSITY_FLOOR,
            max_age_secs: p::MAX_POST_AGE,
            engagement_history_depth: p::ENGAGEMENT_HISTORY_DEPTH,
            scorer_timeout_ms: p::SCORER_TIMEOUT_MS,
            request_timeout_ms: p::REQUEST_TIMEOUT_MS,
            visibility_grace_ms: p::VISIBILITY_GRACE_MS,
            default_result_size: p::RESULT_SIZE,
            max_result_size: p::MAX_RESULT_SIZE,
            in_network_max_results: p::IN_NETWORK_MAX_RESULTS,
            oon_max_results: p::OON_MAX_RESULTS,
            weights: WeightTable::default().to_map(),
            seen_set: SeenSetConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeenSetConfig {
    pub expected_items: usize,
    pub false_positive_rate: f64,
    /// Most recent impressions kept as exact ids next to the bloom filter.
    pub recent_capacity: usize,
}

impl Default for SeenSetConfig {
    fn default() -> Self {
        Self {
            expected_items: p::SEEN_SET_EXPECTED_ITEMS,
            false_positive_rate: p::SEEN_SET_FALSE_POSITIVE_RATE,
            recent_capacity: p::SEEN_RECENT_CAPACITY,
        }
    }
}

impl RankingConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weight_table()?;

        if !(self.oon_factor > 0.0 && self.oon_factor <= 1.0) {
            return Err(invalid("oon_factor", format!("{} not in (0, 1]", self.oon_factor)));
        }
        if !(self.diversity_base > 0.0 && self.diversity_base <= 1.0) {
            return Err(invalid(
                "diversity_base",
                format!("{} not in (0, 1]", self.diversity_base),
            ));
        }
        if !(self.diversity_floor > 0.0 && self.diversity_floor <= 1.0) {
            return Err(invalid(
                "diversity_floor",
                format!("{} not in (0, 1]", self.diversity_floor),
            ));
        }
        if self.max_age_secs == 0 {
            return Err(invalid("max_age_secs", "must be positive".to_string()));
        }
        if self.engagement_history_depth == 0 {
            return Err(invalid("engagement_history_depth", "must be positive".to_string()));
        }
        if self.seen_set.expected_items == 0 {
            return Err(invalid("seen_set.expected_items", "must be positive".to_string()));
        }
        let fp = self.seen_set.false_positive_rate;
        if !(fp > 0.0 && fp < 0.5) {
            return Err(invalid(
                "seen_set.false_positive_rate",
                format!("{} not in (0, 0.5)", fp),
            ));
        }
        if self.scorer_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(invalid("timeouts", "must be positive".to_string()));
        }
        if self.max_result_size == 0 {
            return Err(invalid("max_result_size", "must be positive".to_string()));
        }
        if self.default_result_size == 0 || self.default_result_size > self.max_result_size {
            return Err(invalid(
                "default_result_size",
                format!("{} not in [1, {}]", self.default_result_size, self.max_result_size),
            ));
        }
        Ok(())
    }

    pub fn weight_table(&self) -> Result<WeightTable, ConfigError> {
        WeightTable::from_map(&self.weights)
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParam { name, reason }
}

/// Validated per-channel weights.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    weights: [f64; SIGNAL_COUNT],
}

impl Default for WeightTable {
    fn default() -> Self {
        let mut weights = [0.0; SIGNAL_COUNT];
        for signal in Signal::ALL {
            weights[signal.index()] = match signal {
                Signal::Favorite => p::FAVORITE_WEIGHT,
                Signal::Reply => p::REPLY_WEIGHT,
                Signal::Repost => p::REPOST_WEIGHT,
                Signal::PhotoExpand => p::PHOTO_EXPAND_WEIGHT,
                Signal::Click => p::CLICK_WEIGHT,
                Signal::ProfileClick => p::PROFILE_CLICK_WEIGHT,
                Signal::VideoQualityView => p::VQV_WEIGHT,
                Signal::Share => p::SHARE_WEIGHT,
                Signal::ShareViaDm => p::SHARE_VIA_DM_WEIGHT,
                Signal::ShareViaCopyLink => p::SHARE_VIA_COPY_LINK_WEIGHT,
                Signal::Dwell => p::DWELL_WEIGHT,
                Signal::Quote => p::QUOTE_WEIGHT,
                Signal::QuotedClick => p::QUOTED_CLICK_WEIGHT,
                Signal::FollowAuthor => p::FOLLOW_AUTHOR_WEIGHT,
                Signal::NotInterested => p::NOT_INTERESTED_WEIGHT,
                Signal::BlockAuthor => p::BLOCK_AUTHOR_WEIGHT,
                Signal::MuteAuthor => p::MUTE_AUTHOR_WEIGHT,
                Signal::Report => p::REPORT_WEIGHT,
                Signal::DwellTime => p::CONT_DWELL_TIME_WEIGHT,
            };
        }
        Self { weights }
    }
}

impl WeightTable {
    /// Every channel must be present exactly once, finite, and non-negative
    /// for positive channels. Unknown names are rejected.
    pub fn from_map(map: &BTreeMap<String, f64>) -> Result<Self, ConfigError> {
        let mut weights = [None; SIGNAL_COUNT];
        for (name, value) in map {
            let signal: Signal = name
                .parse()
                .map_err(|_| ConfigError::UnknownSignal(name.clone()))?;
            weights[signal.index()] = Some(*value);
        }

        let mut table = [0.0; SIGNAL_COUNT];
        for signal in Signal::ALL {
            let value = weights[signal.index()].ok_or(ConfigError::MissingWeight(signal))?;
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight { signal, value });
            }
            if signal.polarity() == Polarity::Positive && value < 0.0 {
                return Err(ConfigError::NegativePositiveWeight { signal, value });
            }
            table[signal.index()] = value;
        }
        Ok(Self { weights: table })
    }

    pub fn weight(&self, signal: Signal) -> f64 {
        self.weights[signal.index()]
    }

    /// Largest raw score any signal vector can reach.
    pub fn max_score(&self) -> f64 {
        Signal::ALL
            .iter()
            .filter(|s| s.polarity() == Polarity::Positive)
            .map(|s| self.weight(*s))
            .sum()
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        Signal::ALL
            .iter()
            .map(|s| (s.name().to_string(), self.weight(*s)))
            .collect()
    }
}
