//! Trading signal and position state.

use serde::{Deserialize, Serialize};

/// Crossover signal for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// Short average strictly above long average.
    Long,
    /// Short average at or below long average.
    Short,
}

impl Signal {
    /// Compare two averages. Ties resolve to `Short`.
    pub fn from_averages(short_avg: f64, long_avg: f64) -> Option<Self> {
        if short_avg.is_nan() || long_avg.is_nan() {
            return None;
        }
        if short_avg > long_avg {
            Some(Self::Long)
        } else {
            Some(Self::Short)
        }
    }

    /// `+1.0` for long, `-1.0` for short.
    pub fn direction(&self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    /// Position the signal asks for.
    pub fn target(&self) -> Position {
        match self {
            Self::Long => Position::Long,
            Self::Short => Position::Short,
        }
    }
}

/// Market exposure of a single-instrument backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Flat,
    Long,
    Short,
}

impl Position {
    /// `+1.0`, `-1.0`, or `0.0` when flat.
    pub fn direction(&self) -> f64 {
        match self {
            Self::Flat => 0.0,
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}
