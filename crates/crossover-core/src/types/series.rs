//! Price series types handed to the backtesting engines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::{Error, Result};

/// A single price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Bar timestamp.
    pub timestamp: DateTime<Utc>,
    /// Mid price.
    pub price: f64,
    /// Bid/ask spread in price units. Missing spreads deserialize as zero.
    #[serde(default)]
    pub spread: f64,
}

impl PriceObservation {
    /// Create an observation without spread.
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            spread: 0.0,
        }
    }

    /// Set the bid/ask spread.
    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    /// Ask price (mid plus half spread).
    pub fn ask(&self) -> f64 {
        self.price + self.spread / 2.0
    }

    /// Bid price (mid minus half spread).
    pub fn bid(&self) -> f64 {
        self.price - self.spread / 2.0
    }
}

/// An ordered, validated series of price observations for one instrument.
///
/// The series is immutable once constructed. Engines share it behind an
/// `Arc` and keep their derived columns in their own frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Build a series, checking ordering and value sanity.
    ///
    /// Timestamps must be strictly increasing. Prices and spreads must be
    /// finite and spreads non-negative. Non-positive prices are accepted;
    /// the bars around them get undefined returns downstream.
    pub fn new(symbol: impl Into<String>, observations: Vec<PriceObservation>) -> Result<Self> {
        let symbol = symbol.into();

        for (i, obs) in observations.iter().enumerate() {
            if !obs.price.is_finite() {
                return Err(Error::InvalidSeries(format!(
                    "non-finite price at bar {} ({})",
                    i, obs.timestamp
                )));
            }
            if !obs.spread.is_finite() || obs.spread < 0.0 {
                return Err(Error::InvalidSeries(format!(
                    "spread must be finite and non-negative at bar {} ({})",
                    i, obs.timestamp
                )));
            }
            if obs.price <= 0.0 {
                warn!(
                    symbol = %symbol,
                    bar = i,
                    price = obs.price,
                    "Non-positive price, returns around this bar are undefined"
                );
            }
            if i > 0 && obs.timestamp <= observations[i - 1].timestamp {
                return Err(Error::InvalidSeries(format!(
                    "timestamps must be strictly increasing (bar {} at {} follows {})",
                    i,
                    obs.timestamp,
                    observations[i - 1].timestamp
                )));
            }
        }

        Ok(Self {
            symbol,
            observations,
        })
    }

    /// Build a spread-less series from `(timestamp, price)` pairs.
    pub fn from_prices(
        symbol: impl Into<String>,
        prices: impl IntoIterator<Item = (DateTime<Utc>, f64)>,
    ) -> Result<Self> {
        let observations = prices
            .into_iter()
            .map(|(timestamp, price)| PriceObservation::new(timestamp, price))
            .collect();
        Self::new(symbol, observations)
    }

    /// Instrument symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn get(&self, bar: usize) -> Option<&PriceObservation> {
        self.observations.get(bar)
    }

    pub fn first(&self) -> Option<&PriceObservation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&PriceObservation> {
        self.observations.last()
    }

    /// Mid prices in bar order.
    pub fn prices(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.price).collect()
    }

    /// Whether any bar carries a non-zero spread.
    pub fn has_spread(&self) -> bool {
        self.observations.iter().any(|o| o.spread > 0.0)
    }

    /// Per-bar log returns, `ln(p[t] / p[t-1])`.
    ///
    /// The first bar, and any bar where either price is non-positive, is NaN.
    pub fn log_returns(&self) -> Vec<f64> {
        let mut returns = Vec::with_capacity(self.observations.len());
        if self.observations.is_empty() {
            return returns;
        }

        returns.push(f64::NAN);
        for pair in self.observations.windows(2) {
            let (prev, curr) = (pair[0].price, pair[1].price);
            if prev > 0.0 && curr > 0.0 {
                returns.push((curr / prev).ln());
            } else {
                returns.push(f64::NAN);
            }
        }
        returns
    }

    /// Sub-series with timestamps inside `[start, end]` (both inclusive).
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let observations = self
            .observations
            .iter()
            .filter(|o| o.timestamp >= start && o.timestamp <= end)
            .copied()
            .collect();

        Self {
            symbol: self.symbol.clone(),
            observations,
        }
    }

    /// Parse a `{"symbol": .., "observations": [..]}` document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a series from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let series = Self::from_json_str(&raw)?;
        debug!(
            path = %path.as_ref().display(),
            symbol = %series.symbol,
            bars = series.len(),
            "Loaded price series"
        );
        Ok(series)
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            symbol: String,
            observations: Vec<PriceObservation>,
        }

        let raw = Raw::deserialize(deserializer)?;
        PriceSeries::new(raw.symbol, raw.observations).map_err(serde::de::Error::custom)
    }
}
