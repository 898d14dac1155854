use serde::Serialize;

/// Coarse reading of a final score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachTier {
    Low,
    ModerateLow,
    Moderate,
    Good,
    Excellent,
    Viral,
}

impl ReachTier {
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            ReachTier::Low
        } else if score < 0.6 {
            ReachTier::ModerateLow
        } else if score < 1.0 {
            ReachTier::Moderate
        } else if score < 1.5 {
            ReachTier::Good
        } else if score < 2.0 {
            ReachTier::Excellent
        } else {
            ReachTier::Viral
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ReachTier::Low => "likely to be suppressed",
            ReachTier::ModerateLow => "will struggle to gain traction",
            ReachTier::Moderate => "should reach some viewers",
            ReachTier::Good => "well positioned",
            ReachTier::Excellent => "strong distribution",
            ReachTier::Viral => "maximum distribution",
        }
    }
}
