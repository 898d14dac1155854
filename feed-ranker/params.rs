//! Default ranking parameters. Every value here can be overridden through
//! [`crate::config::RankingConfig`].

// Positive engagement weights
pub const FAVORITE_WEIGHT: f64 = 1.0;
pub const REPLY_WEIGHT: f64 = 0.8;
pub const REPOST_WEIGHT: f64 = 0.75;
pub const PHOTO_EXPAND_WEIGHT: f64 = 0.2;
pub const CLICK_WEIGHT: f64 = 0.15;
pub const PROFILE_CLICK_WEIGHT: f64 = 0.5;
pub const VQV_WEIGHT: f64 = 0.9;
pub const SHARE_WEIGHT: f64 = 0.4;
pub const SHARE_VIA_DM_WEIGHT: f64 = 0.5;
pub const SHARE_VIA_COPY_LINK_WEIGHT: f64 = 0.45;
pub const DWELL_WEIGHT: f64 = 0.3;
pub const QUOTE_WEIGHT: f64 = 0.7;
pub const FOLLOW_AUTHOR_WEIGHT: f64 = 1.2;

// Neutral channels, predicted but not weighted by default
pub const QUOTED_CLICK_WEIGHT: f64 = 0.0;
pub const CONT_DWELL_TIME_WEIGHT: f64 = 0.0;

// Negative engagement weights. Always subtracted by magnitude.
pub const NOT_INTERESTED_WEIGHT: f64 = -0.6;
pub const BLOCK_AUTHOR_WEIGHT: f64 = -1.5;
pub const MUTE_AUTHOR_WEIGHT: f64 = -1.2;
pub const REPORT_WEIGHT: f64 = -2.0;

pub const OON_WEIGHT_FACTOR: f64 = 0.7;

pub const AUTHOR_DIVERSITY_DECAY: f64 = 0.45;
pub const AUTHOR_DIVERSITY_FLOOR: f64 = 0.10;

/// Seconds. A post exactly this old is excluded.
pub const MAX_POST_AGE: u64 = 48 * 60 * 60;

pub const ENGAGEMENT_HISTORY_DEPTH: usize = 128;

pub const SEEN_SET_EXPECTED_ITEMS: usize = 10_000;
pub const SEEN_SET_FALSE_POSITIVE_RATE: f64 = 0.01;
pub const SEEN_RECENT_CAPACITY: usize = 1_000;

pub const SCORER_TIMEOUT_MS: u64 = 500;
pub const REQUEST_TIMEOUT_MS: u64 = 2_000;
/// Visibility budget for a partial feed once the request deadline passed.
pub const VISIBILITY_GRACE_MS: u64 = 250;

pub const RESULT_SIZE: usize = 35;
pub const MAX_RESULT_SIZE: usize = 500;

pub const IN_NETWORK_MAX_RESULTS: usize = 800;
pub const OON_MAX_RESULTS: usize = 500;
