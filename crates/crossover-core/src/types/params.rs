//! Strategy parameters, optimizer grid ranges, and engine selection.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Window lengths for a moving-average crossover strategy.
///
/// No ordering is enforced between the two windows. `short_window >= long_window`
/// is legal and simply inverts the crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyParameters {
    pub short_window: usize,
    pub long_window: usize,
}

impl StrategyParameters {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }

    /// Reject zero-length windows.
    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 || self.long_window == 0 {
            return Err(Error::InvalidParameters(format!(
                "window lengths must be positive (short = {}, long = {})",
                self.short_window, self.long_window
            )));
        }
        Ok(())
    }

    /// The larger of the two windows.
    pub fn max_window(&self) -> usize {
        self.short_window.max(self.long_window)
    }
}

impl std::fmt::Display for StrategyParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "short = {}, long = {}", self.short_window, self.long_window)
    }
}

/// Half-open integer range `[start, stop)` stepped by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRange {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl GridRange {
    pub fn new(start: i64, stop: i64, step: i64) -> Self {
        Self { start, stop, step }
    }

    pub fn validate(&self) -> Result<()> {
        if self.step <= 0 {
            return Err(Error::InvalidParameters(format!(
                "grid step must be positive, got {}",
                self.step
            )));
        }
        if self.start >= self.stop {
            return Err(Error::InvalidParameters(format!(
                "grid start ({}) must be below stop ({})",
                self.start, self.stop
            )));
        }
        Ok(())
    }

    /// Window lengths covered by the range.
    ///
    /// Values below one cannot be window lengths and are rejected.
    pub fn windows(&self) -> Result<Vec<usize>> {
        self.validate()?;

        let mut windows = Vec::new();
        let mut value = self.start;
        while value < self.stop {
            let window = usize::try_from(value)
                .ok()
                .filter(|w| *w > 0)
                .ok_or_else(|| {
                    Error::InvalidParameters(format!("grid value {} is not a valid window", value))
                })?;
            windows.push(window);
            value += self.step;
        }
        Ok(windows)
    }

    /// Number of values in the range (zero when invalid).
    pub fn len(&self) -> usize {
        if self.step <= 0 || self.start >= self.stop {
            return 0;
        }
        ((self.stop - self.start + self.step - 1) / self.step) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Moving-average flavour used to smooth prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// Arithmetic mean of the trailing window.
    Simple,
    /// Exponentially weighted mean with span equal to the window.
    #[default]
    Exponential,
}

impl std::fmt::Display for Smoothing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Exponential => write!(f, "exponential"),
        }
    }
}

impl std::str::FromStr for Smoothing {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" | "sma" => Ok(Self::Simple),
            "exponential" | "ema" => Ok(Self::Exponential),
            _ => Err(format!("Invalid smoothing: {}", s)),
        }
    }
}

/// Backtesting engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Bulk computation over the whole series.
    #[default]
    Vectorized,
    /// Bar-by-bar replay with cash and inventory accounting.
    Iterative,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vectorized => write!(f, "vectorized"),
            Self::Iterative => write!(f, "iterative"),
        }
    }
}

impl std::str::FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vectorized" => Ok(Self::Vectorized),
            "iterative" => Ok(Self::Iterative),
            _ => Err(format!("Invalid engine: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_reject_zero_window() {
        assert!(StrategyParameters::new(0, 5).validate().is_err());
        assert!(StrategyParameters::new(5, 0).validate().is_err());
        assert!(StrategyParameters::new(5, 2).validate().is_ok());
    }

    #[test]
    fn test_grid_range_windows() {
        let range = GridRange::new(10, 50, 10);
        assert_eq!(range.windows().unwrap(), vec![10, 20, 30, 40]);
        assert_eq!(range.len(), 4);

        let uneven = GridRange::new(1, 6, 2);
        assert_eq!(uneven.windows().unwrap(), vec![1, 3, 5]);
        assert_eq!(uneven.len(), 3);
    }

    #[test]
    fn test_grid_range_validation() {
        assert!(matches!(
            GridRange::new(1, 10, 0).validate(),
            Err(Error::InvalidParameters(_))
        ));
        assert!(GridRange::new(1, 10, -1).validate().is_err());
        assert!(GridRange::new(10, 10, 1).validate().is_err());
        assert!(GridRange::new(11, 10, 1).validate().is_err());
        assert!(GridRange::new(0, 3, 1).windows().is_err());
        assert!(GridRange::new(10, 10, 1).is_empty());
    }

    #[test]
    fn test_smoothing_from_str() {
        assert_eq!("SMA".parse::<Smoothing>().unwrap(), Smoothing::Simple);
        assert_eq!("exponential".parse::<Smoothing>().unwrap(), Smoothing::Exponential);
        assert!("wma".parse::<Smoothing>().is_err());
        assert_eq!("Iterative".parse::<EngineKind>().unwrap(), EngineKind::Iterative);
    }
}
