//! Moving-average smoothing and crossover signal generation.

use crossover_core::types::{PriceSeries, Signal, Smoothing, StrategyParameters};
use std::sync::Arc;

/// Produces crossover signals from two smoothed price series.
pub trait SignalGenerator: Send + Sync {
    /// Generator name for logs and reports.
    fn name(&self) -> &'static str;

    /// Smooth `prices` with the given window. Undefined bars are NaN.
    fn smooth(&self, prices: &[f64], window: usize) -> Vec<f64>;

    /// Per-bar signal for `series`, `None` where either average is undefined.
    fn compute_signal(
        &self,
        series: &PriceSeries,
        params: &StrategyParameters,
    ) -> Vec<Option<Signal>> {
        let prices = series.prices();
        let short = self.smooth(&prices, params.short_window);
        let long = self.smooth(&prices, params.long_window);
        crossover(&short, &long)
    }
}

/// Compare two average columns bar by bar.
pub fn crossover(short: &[f64], long: &[f64]) -> Vec<Option<Signal>> {
    short
        .iter()
        .zip(long)
        .map(|(s, l)| Signal::from_averages(*s, *l))
        .collect()
}

/// Arithmetic mean of the trailing window.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMovingAverage;

impl SignalGenerator for SimpleMovingAverage {
    fn name(&self) -> &'static str {
        "sma_crossover"
    }

    fn smooth(&self, prices: &[f64], window: usize) -> Vec<f64> {
        let mut out = vec![f64::NAN; prices.len()];
        if window == 0 || window > prices.len() {
            return out;
        }

        for (i, chunk) in prices.windows(window).enumerate() {
            out[i + window - 1] = chunk.iter().sum::<f64>() / window as f64;
        }
        out
    }
}

/// Exponentially weighted mean with `span = window`.
///
/// Uses bias-adjusted weights: bar `t` is
/// `sum((1-a)^i * p[t-i]) / sum((1-a)^i)` with `a = 2 / (window + 1)`,
/// so the average is defined from the first bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialMovingAverage;

impl SignalGenerator for ExponentialMovingAverage {
    fn name(&self) -> &'static str {
        "ema_crossover"
    }

    fn smooth(&self, prices: &[f64], window: usize) -> Vec<f64> {
        if window == 0 {
            return vec![f64::NAN; prices.len()];
        }

        let alpha = 2.0 / (window as f64 + 1.0);
        let decay = 1.0 - alpha;
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        prices
            .iter()
            .map(|price| {
                numerator = price + decay * numerator;
                denominator = 1.0 + decay * denominator;
                numerator / denominator
            })
            .collect()
    }
}

/// Shared generator for a configured smoothing mode.
pub fn generator_for(smoothing: Smoothing) -> Arc<dyn SignalGenerator> {
    match smoothing {
        Smoothing::Simple => Arc::new(SimpleMovingAverage),
        Smoothing::Exponential => Arc::new(ExponentialMovingAverage),
    }
}
