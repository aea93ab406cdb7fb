//! Buy-and-hold return statistics for a price series.

use serde::{Deserialize, Serialize};

use crate::types::PriceSeries;

/// Trading periods per year used for annualization.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Summary of a series' log returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    /// Mean per-bar log return.
    pub mean_return: f64,
    /// Sample standard deviation of per-bar log returns.
    pub std_return: f64,
    /// Mean return scaled to a year, rounded to 3 decimals.
    pub annualized_return: f64,
    /// Standard deviation scaled to a year, rounded to 3 decimals.
    pub annualized_risk: f64,
    /// Number of returns the statistics are based on.
    pub observations: usize,
}

impl ReturnStats {
    /// Compute statistics over the defined log returns of `series`.
    ///
    /// Returns `None` when fewer than two returns are defined.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let returns: Vec<f64> = series
            .log_returns()
            .into_iter()
            .filter(|r| r.is_finite())
            .collect();

        if returns.len() < 2 {
            return None;
        }

        let n = returns.len() as f64;
        let mean_return = returns.iter().sum::<f64>() / n;
        let variance = returns
            .iter()
            .map(|r| (r - mean_return).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        let std_return = variance.sqrt();

        Some(Self {
            mean_return,
            std_return,
            annualized_return: round_to(mean_return * PERIODS_PER_YEAR, 3),
            annualized_risk: round_to(std_return * PERIODS_PER_YEAR.sqrt(), 3),
            observations: returns.len(),
        })
    }
}

/// Cumulative buy-and-hold growth, `exp(cumsum(r))`, per bar.
///
/// Undefined returns contribute nothing; the first bar is NaN.
pub fn cumulative_returns(series: &PriceSeries) -> Vec<f64> {
    let mut acc = 0.0;
    series
        .log_returns()
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            if i == 0 {
                return f64::NAN;
            }
            if r.is_finite() {
                acc += r;
            }
            acc.exp()
        })
        .collect()
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
