//! Vectorized crossover backtest over a whole price series.

use chrono::{DateTime, Utc};
use crossover_core::stats::round_to;
use crossover_core::types::{PriceSeries, Signal, StrategyParameters};
use crossover_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::optimizer::Backtest;
use crate::signal::{crossover, SignalGenerator};

/// Decimal places used when reporting vectorized results.
pub const REPORT_DECIMALS: i32 = 6;

/// Summary of a vectorized run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizedResult {
    /// Parameters the run used.
    pub parameters: StrategyParameters,
    /// Final buy-and-hold growth factor.
    pub cumulative_return: f64,
    /// Final strategy growth factor.
    pub cumulative_strategy_return: f64,
    /// Strategy minus buy-and-hold.
    pub outperformance: f64,
    /// Bars that contributed a strategy return.
    pub bars: usize,
}

impl std::fmt::Display for VectorizedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | strategy = {} | buy & hold = {} | outperformance = {}",
            self.parameters,
            self.cumulative_strategy_return,
            self.cumulative_return,
            self.outperformance
        )
    }
}

/// One retained bar of a vectorized run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizedBar {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub log_return: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    /// Signal computed at this bar (applies to the next bar).
    pub signal: Option<Signal>,
    /// Signal from the previous kept bar, which earns this bar's return.
    pub position: Signal,
    pub strategy_return: f64,
    pub cumulative_return: f64,
    pub cumulative_strategy: f64,
}

/// Bulk backtester: every bar's return is computed in one pass.
#[derive(Clone)]
pub struct VectorizedBacktester {
    series: Arc<PriceSeries>,
    generator: Arc<dyn SignalGenerator>,
    params: StrategyParameters,
    prices: Arc<[f64]>,
    log_returns: Arc<[f64]>,
    short_ma: Vec<f64>,
    long_ma: Vec<f64>,
    results: Option<Arc<[VectorizedBar]>>,
}

impl VectorizedBacktester {
    /// Prepare a backtester; log returns and both averages are computed here.
    pub fn new(
        series: Arc<PriceSeries>,
        generator: Arc<dyn SignalGenerator>,
        params: StrategyParameters,
    ) -> Result<Self> {
        params.validate()?;

        let prices: Arc<[f64]> = series.prices().into();
        let log_returns: Arc<[f64]> = series.log_returns().into();
        let short_ma = generator.smooth(&prices, params.short_window);
        let long_ma = generator.smooth(&prices, params.long_window);

        Ok(Self {
            series,
            generator,
            params,
            prices,
            log_returns,
            short_ma,
            long_ma,
            results: None,
        })
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn parameters(&self) -> StrategyParameters {
        self.params
    }

    pub fn short_ma(&self) -> &[f64] {
        &self.short_ma
    }

    pub fn long_ma(&self) -> &[f64] {
        &self.long_ma
    }

    pub fn log_returns(&self) -> &[f64] {
        &self.log_returns
    }

    /// Retained bars of the most recent run.
    pub fn results(&self) -> Option<&[VectorizedBar]> {
        self.results.as_deref()
    }

    /// Change the windows, recomputing only the averages that changed.
    pub fn set_parameters(&mut self, params: StrategyParameters) -> Result<()> {
        params.validate()?;

        if params.short_window != self.params.short_window {
            self.short_ma = self.generator.smooth(&self.prices, params.short_window);
        }
        if params.long_window != self.params.long_window {
            self.long_ma = self.generator.smooth(&self.prices, params.long_window);
        }
        self.params = params;
        Ok(())
    }

    /// Run the strategy over the whole series.
    pub fn run(&mut self) -> Result<VectorizedResult> {
        let required = self.params.max_window();
        if self.series.len() <= required {
            return Err(Error::InsufficientData {
                bars: self.series.len(),
                required,
            });
        }

        let signal = crossover(&self.short_ma, &self.long_ma);
        let observations = self.series.observations();

        let mut frame = Vec::with_capacity(observations.len());
        let mut sum_returns = 0.0;
        let mut sum_strategy = 0.0;
        let mut degenerate = 0usize;
        // Signal of the last kept bar; a dropped bar never hands on its position.
        let mut held: Option<Signal> = None;

        for t in 0..observations.len() {
            let current = match signal[t] {
                Some(s) => s,
                None => continue,
            };
            let log_return = self.log_returns[t];
            if !log_return.is_finite() {
                if t > 0 {
                    degenerate += 1;
                }
                continue;
            }

            let position = match held.replace(current) {
                Some(s) => s,
                None => continue,
            };
            let strategy_return = position.direction() * log_return;
            sum_returns += log_return;
            sum_strategy += strategy_return;

            frame.push(VectorizedBar {
                timestamp: observations[t].timestamp,
                price: observations[t].price,
                log_return,
                short_ma: self.short_ma[t],
                long_ma: self.long_ma[t],
                signal: signal[t],
                position,
                strategy_return,
                cumulative_return: sum_returns.exp(),
                cumulative_strategy: sum_strategy.exp(),
            });
        }

        if degenerate > 0 {
            warn!(
                symbol = self.series.symbol(),
                bars = degenerate,
                "Excluded bars with undefined log returns"
            );
        }
        if frame.is_empty() {
            return Err(Error::InsufficientData {
                bars: self.series.len(),
                required,
            });
        }

        let buy_and_hold = sum_returns.exp();
        let strategy = sum_strategy.exp();
        let result = VectorizedResult {
            parameters: self.params,
            cumulative_return: round_to(buy_and_hold, REPORT_DECIMALS),
            cumulative_strategy_return: round_to(strategy, REPORT_DECIMALS),
            outperformance: round_to(strategy - buy_and_hold, REPORT_DECIMALS),
            bars: frame.len(),
        };

        debug!(
            symbol = self.series.symbol(),
            generator = self.generator.name(),
            short = self.params.short_window,
            long = self.params.long_window,
            strategy = result.cumulative_strategy_return,
            outperformance = result.outperformance,
            "Vectorized backtest completed"
        );

        self.results = Some(frame.into());
        Ok(result)
    }
}

impl Backtest for VectorizedBacktester {
    fn parameters(&self) -> StrategyParameters {
        self.params
    }

    fn set_parameters(&mut self, params: StrategyParameters) -> Result<()> {
        VectorizedBacktester::set_parameters(self, params)
    }

    /// Cumulative strategy return.
    fn evaluate(&mut self) -> Result<f64> {
        self.run().map(|r| r.cumulative_strategy_return)
    }
}
