use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const SIGNAL_COUNT: usize = 19;

/// Engagement channels predicted for every candidate. The discriminant is the
/// channel's slot in a [`SignalVector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Favorite,
    Reply,
    Repost,
    PhotoExpand,
    Click,
    ProfileClick,
    VideoQualityView,
    Share,
    ShareViaDm,
    ShareViaCopyLink,
    Dwell,
    Quote,
    QuotedClick,
    FollowAuthor,
    NotInterested,
    BlockAuthor,
    MuteAuthor,
    Report,
    DwellTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Signal {
    pub const ALL: [Signal; SIGNAL_COUNT] = [
        Signal::Favorite,
        Signal::Reply,
        Signal::Repost,
        Signal::PhotoExpand,
        Signal::Click,
        Signal::ProfileClick,
        Signal::VideoQualityView,
        Signal::Share,
        Signal::ShareViaDm,
        Signal::ShareViaCopyLink,
        Signal::Dwell,
        Signal::Quote,
        Signal::QuotedClick,
        Signal::FollowAuthor,
        Signal::NotInterested,
        Signal::BlockAuthor,
        Signal::MuteAuthor,
        Signal::Report,
        Signal::DwellTime,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn polarity(self) -> Polarity {
        match self {
            Signal::NotInterested | Signal::BlockAuthor | Signal::MuteAuthor | Signal::Report => {
                Polarity::Negative
            }
            _ => Polarity::Positive,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Signal::Favorite => "favorite",
            Signal::Reply => "reply",
            Signal::Repost => "repost",
            Signal::PhotoExpand => "photo_expand",
            Signal::Click => "click",
            Signal::ProfileClick => "profile_click",
            Signal::VideoQualityView => "video_quality_view",
            Signal::Share => "share",
            Signal::ShareViaDm => "share_via_dm",
            Signal::ShareViaCopyLink => "share_via_copy_link",
            Signal::Dwell => "dwell",
            Signal::Quote => "quote",
            Signal::QuotedClick => "quoted_click",
            Signal::FollowAuthor => "follow_author",
            Signal::NotInterested => "not_interested",
            Signal::BlockAuthor => "block_author",
            Signal::MuteAuthor => "mute_author",
            Signal::Report => "report",
            Signal::DwellTime => "dwell_time",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Signal {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::ALL
            .iter()
            .copied()
            .find(|signal| signal.name() == s)
            .ok_or_else(|| SignalError::Unknown(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("signal '{0}' is missing")]
    Missing(Signal),

    #[error("signal '{signal}' has value {value}, expected a probability in [0, 1]")]
    OutOfRange { signal: Signal, value: f64 },

    #[error("unknown signal '{0}'")]
    Unknown(String),

    #[error("signal '{0}' given more than once")]
    Duplicate(Signal),
}

/// One probability per channel. Construction rejects missing channels and
/// values outside `[0, 1]`, so a vector that exists is always complete.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalVector {
    values: [f64; SIGNAL_COUNT],
}

impl SignalVector {
    pub fn from_values(values: [f64; SIGNAL_COUNT]) -> Result<Self, SignalError> {
        for signal in Signal::ALL {
            let value = values[signal.index()];
            if !(0.0..=1.0).contains(&value) {
                return Err(SignalError::OutOfRange { signal, value });
            }
        }
        Ok(Self { values })
    }

    /// Builds a vector from `(channel, value)` pairs. Every channel must
    /// appear exactly once.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Signal, f64)>,
    ) -> Result<Self, SignalError> {
        let mut values: [Option<f64>; SIGNAL_COUNT] = [None; SIGNAL_COUNT];
        for (signal, value) in pairs {
            let slot = &mut values[signal.index()];
            if slot.is_some() {
                return Err(SignalError::Duplicate(signal));
            }
            *slot = Some(value);
        }

        let mut complete = [0.0; SIGNAL_COUNT];
        for signal in Signal::ALL {
            complete[signal.index()] = values[signal.index()].ok_or(SignalError::Missing(signal))?;
        }
        Self::from_values(complete)
    }

    pub fn from_named(named: &HashMap<String, f64>) -> Result<Self, SignalError> {
        let pairs = named
            .iter()
            .map(|(name, value)| Ok((name.parse::<Signal>()?, *value)))
            .collect::<Result<Vec<_>, SignalError>>()?;
        Self::from_pairs(pairs)
    }

    pub fn get(&self, signal: Signal) -> f64 {
        self.values[signal.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Signal, f64)> + '_ {
        Signal::ALL.iter().map(|signal| (*signal, self.get(*signal)))
    }

    pub fn to_map(&self) -> BTreeMap<Signal, f64> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(value: f64) -> HashMap<String, f64> {
        Signal::ALL
            .iter()
            .map(|signal| (signal.name().to_string(), value))
            .collect()
    }

    #[test]
    fn index_matches_channel_order() {
        for (i, signal) in Signal::ALL.iter().enumerate() {
            assert_eq!(signal.index(), i);
        }
        assert_eq!(Signal::DwellTime.index(), SIGNAL_COUNT - 1);
    }

    #[test]
    fn only_four_channels_are_negative() {
        let negative: Vec<_> = Signal::ALL
            .iter()
            .filter(|s| s.polarity() == Polarity::Negative)
            .collect();
        assert_eq!(
            negative,
            vec![
                &Signal::NotInterested,
                &Signal::BlockAuthor,
                &Signal::MuteAuthor,
                &Signal::Report
            ]
        );
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for signal in Signal::ALL {
            assert_eq!(signal.name().parse::<Signal>(), Ok(signal));
        }
        assert_eq!(
            "likes".parse::<Signal>(),
            Err(SignalError::Unknown("likes".to_string()))
        );
    }

    #[test]
    fn missing_channel_is_rejected() {
        let mut map = named(0.1);
        map.remove("report");
        assert_eq!(
            SignalVector::from_named(&map),
            Err(SignalError::Missing(Signal::Report))
        );
    }

    #[test]
    fn out_of_range_and_nan_are_rejected() {
        let mut values = [0.5; SIGNAL_COUNT];
        values[Signal::Reply.index()] = 1.5;
        assert!(matches!(
            SignalVector::from_values(values),
            Err(SignalError::OutOfRange { signal: Signal::Reply, .. })
        ));

        let mut values = [0.5; SIGNAL_COUNT];
        values[Signal::Share.index()] = f64::NAN;
        assert!(matches!(
            SignalVector::from_values(values),
            Err(SignalError::OutOfRange { signal: Signal::Share, .. })
        ));
    }

    #[test]
    fn duplicate_pair_is_rejected() {
        let pairs = Signal::ALL
            .iter()
            .map(|s| (*s, 0.0))
            .chain(std::iter::once((Signal::Quote, 0.2)));
        assert_eq!(
            SignalVector::from_pairs(pairs),
            Err(SignalError::Duplicate(Signal::Quote))
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut values = [0.0; SIGNAL_COUNT];
        values[Signal::Favorite.index()] = 1.0;
        let vector = SignalVector::from_values(values).unwrap();
        assert_eq!(vector.get(Signal::Favorite), 1.0);
        assert_eq!(vector.get(Signal::Report), 0.0);
    }
}
