//! Event-driven crossover backtest with cash, inventory and spread costs.
//!
//! Bars are replayed in order. At each bar the crossover signal drives a
//! `Flat | Long | Short` state machine; position flips close the existing
//! inventory before re-opening with all available cash. The final bar is
//! reserved for a forced close of whatever is still open.

use chrono::{DateTime, Utc};
use crossover_core::config::AccountConfig;
use crossover_core::types::{PriceObservation, PriceSeries, Position, Signal, StrategyParameters};
use crossover_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::account::{Account, OrderRequest, TradeRecord, TradeType};
use crate::optimizer::Backtest;
use crate::signal::SignalGenerator;

/// Account settings for an iterative run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterativeConfig {
    /// Starting cash balance.
    pub initial_balance: f64,
    /// Charge half the spread against the trader on every order.
    pub use_spread: bool,
}

impl Default for IterativeConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            use_spread: true,
        }
    }
}

impl From<&AccountConfig> for IterativeConfig {
    fn from(config: &AccountConfig) -> Self {
        Self {
            initial_balance: config.initial_balance,
            use_spread: config.use_spread,
        }
    }
}

/// Summary of an iterative run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterativeResult {
    pub parameters: StrategyParameters,
    pub initial_balance: f64,
    pub final_balance: f64,
    /// `(final - initial) / initial * 100`.
    pub net_performance_pct: f64,
    pub trade_count: usize,
    /// Bars replayed, including the terminal bar.
    pub bars: usize,
}

impl IterativeResult {
    pub fn is_profitable(&self) -> bool {
        self.final_balance > self.initial_balance
    }
}

impl std::fmt::Display for IterativeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | final balance = {:.2} | net performance (%) = {:.2} | trades = {}",
            self.parameters, self.final_balance, self.net_performance_pct, self.trade_count
        )
    }
}

/// State of the account after processing one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterativeBar {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub spread: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    pub signal: Signal,
    pub position: Position,
    pub cash_balance: f64,
    pub inventory_units: f64,
    /// Net asset value at the bar's mid price.
    pub nav: f64,
}

/// Bar-by-bar backtester with explicit order execution.
#[derive(Clone)]
pub struct IterativeBacktester {
    series: Arc<PriceSeries>,
    generator: Arc<dyn SignalGenerator>,
    params: StrategyParameters,
    config: IterativeConfig,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    spread_active: bool,
    account: Account,
    position: Position,
    trades: Vec<TradeRecord>,
    frame: Vec<IterativeBar>,
    last_quote: Option<PriceObservation>,
    completed: Option<IterativeResult>,
}

impl IterativeBacktester {
    pub fn new(
        series: Arc<PriceSeries>,
        generator: Arc<dyn SignalGenerator>,
        params: StrategyParameters,
        config: IterativeConfig,
    ) -> Result<Self> {
        params.validate()?;
        if !config.initial_balance.is_finite() || config.initial_balance <= 0.0 {
            return Err(Error::InvalidParameters(format!(
                "initial balance must be positive, got {}",
                config.initial_balance
            )));
        }

        // A series without spreads disables spread costing.
        let spread_active = config.use_spread && series.has_spread();

        Ok(Self {
            series,
            generator,
            params,
            config,
            range: None,
            spread_active,
            account: Account::new(config.initial_balance),
            position: Position::Flat,
            trades: Vec::new(),
            frame: Vec::new(),
            last_quote: None,
            completed: None,
        })
    }

    /// Restrict runs to bars within `[start, end]`.
    pub fn with_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.range = Some((start, end));
        self
    }

    pub fn parameters(&self) -> StrategyParameters {
        self.params
    }

    pub fn config(&self) -> &IterativeConfig {
        &self.config
    }

    /// Whether orders pay half the spread.
    pub fn spread_active(&self) -> bool {
        self.spread_active
    }

    pub fn set_parameters(&mut self, params: StrategyParameters) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Buy at the ask (or mid when spread costing is off).
    ///
    /// Orders placed outside [`run`](Self::run) discard the completed run, so
    /// reporting never mixes a run's result with later manual trades.
    pub fn buy(&mut self, quote: &PriceObservation, request: OrderRequest) -> Result<TradeRecord> {
        let price = quote.price + self.half_spread(quote);
        let units = request.resolve_units(price)?;

        self.completed = None;
        self.account.cash_balance -= units * price;
        self.account.inventory_units += units;
        self.account.trade_count += 1;

        debug!(timestamp = %quote.timestamp, units, price, "Buying");
        Ok(self.record(quote.timestamp, TradeType::Buy, units, price))
    }

    /// Sell at the bid (or mid when spread costing is off).
    pub fn sell(&mut self, quote: &PriceObservation, request: OrderRequest) -> Result<TradeRecord> {
        let price = quote.price - self.half_spread(quote);
        let units = request.resolve_units(price)?;

        self.completed = None;
        self.account.cash_balance += units * price;
        self.account.inventory_units -= units;
        self.account.trade_count += 1;

        debug!(timestamp = %quote.timestamp, units, price, "Selling");
        Ok(self.record(quote.timestamp, TradeType::Sell, units, price))
    }

    /// Flatten the inventory at `quote`, paying half the spread on the
    /// closed units. Always counts as one trade.
    pub fn close_position(&mut self, quote: &PriceObservation) -> TradeRecord {
        let units = self.account.inventory_units;
        let half_spread = self.half_spread(quote);

        self.completed = None;
        self.account.cash_balance += units * quote.price - units.abs() * half_spread;
        self.account.inventory_units = 0.0;
        self.account.trade_count += 1;
        self.position = Position::Flat;

        let price = if units > 0.0 {
            quote.price - half_spread
        } else if units < 0.0 {
            quote.price + half_spread
        } else {
            quote.price
        };

        debug!(timestamp = %quote.timestamp, units, price, "Closing final position");
        self.record(quote.timestamp, TradeType::Close, units, price)
    }

    /// Replay the series with the current parameters.
    pub fn run(&mut self) -> Result<IterativeResult> {
        self.reset();

        let series = Arc::clone(&self.series);
        let observations = &series.observations()[self.bar_range()];
        let required = self.params.max_window();
        if observations.len() <= required {
            return Err(Error::InsufficientData {
                bars: observations.len(),
                required,
            });
        }

        let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();
        let short_ma = self.generator.smooth(&prices, self.params.short_window);
        let long_ma = self.generator.smooth(&prices, self.params.long_window);

        let first = (0..observations.len())
            .find(|&i| !short_ma[i].is_nan() && !long_ma[i].is_nan())
            .unwrap_or(observations.len());
        if observations.len() - first < 2 {
            return Err(Error::InsufficientData {
                bars: observations.len(),
                required,
            });
        }

        info!(
            symbol = self.series.symbol(),
            generator = self.generator.name(),
            short = self.params.short_window,
            long = self.params.long_window,
            "Testing crossover strategy"
        );

        let last = observations.len() - 1;
        for bar in first..last {
            let quote = observations[bar];
            let signal = match Signal::from_averages(short_ma[bar], long_ma[bar]) {
                Some(s) => s,
                None => continue,
            };

            if quote.price <= 0.0 {
                warn!(
                    timestamp = %quote.timestamp,
                    price = quote.price,
                    "Skipping bar with non-positive price"
                );
            } else {
                match signal {
                    Signal::Long if self.position != Position::Long => self.go_long(&quote)?,
                    Signal::Short if self.position != Position::Short => self.go_short(&quote)?,
                    _ => {}
                }
            }

            self.push_bar(&quote, short_ma[bar], long_ma[bar], signal);
        }

        let quote = observations[last];
        let closing_signal =
            Signal::from_averages(short_ma[last], long_ma[last]).unwrap_or(Signal::Short);
        self.close_position(&quote);
        self.push_bar(&quote, short_ma[last], long_ma[last], closing_signal);

        let final_balance = self.account.cash_balance;
        let initial_balance = self.config.initial_balance;
        let result = IterativeResult {
            parameters: self.params,
            initial_balance,
            final_balance,
            net_performance_pct: (final_balance - initial_balance) / initial_balance * 100.0,
            trade_count: self.account.trade_count,
            bars: observations.len() - first,
        };

        info!(
            symbol = self.series.symbol(),
            final_balance = result.final_balance,
            net_performance_pct = result.net_performance_pct,
            trades = result.trade_count,
            "Iterative backtest completed"
        );

        self.last_quote = Some(quote);
        self.completed = Some(result);
        Ok(result)
    }

    /// Account of the last completed run.
    pub fn account(&self) -> Result<&Account> {
        self.require_completed()?;
        Ok(&self.account)
    }

    pub fn current_balance(&self) -> Result<f64> {
        Ok(self.account()?.cash_balance)
    }

    /// Inventory value at the final bar's price.
    pub fn position_value(&self) -> Result<f64> {
        let price = self.final_price()?;
        Ok(self.account.position_value(price))
    }

    /// Net asset value at the final bar's price.
    pub fn net_asset_value(&self) -> Result<f64> {
        let price = self.final_price()?;
        Ok(self.account.net_asset_value(price))
    }

    pub fn position(&self) -> Result<Position> {
        self.require_completed()?;
        Ok(self.position)
    }

    /// Orders executed in the last completed run.
    pub fn trades(&self) -> Result<&[TradeRecord]> {
        self.require_completed()?;
        Ok(&self.trades)
    }

    /// Per-bar account state of the last completed run.
    pub fn results(&self) -> Result<&[IterativeBar]> {
        self.require_completed()?;
        Ok(&self.frame)
    }

    pub fn last_result(&self) -> Option<&IterativeResult> {
        self.completed.as_ref()
    }

    // Private methods

    fn go_long(&mut self, quote: &PriceObservation) -> Result<()> {
        if self.position == Position::Short {
            let units = self.account.inventory_units.abs();
            self.buy(quote, OrderRequest::units(units))?;
        }

        let cash = self.account.cash_balance;
        if cash > 0.0 {
            self.buy(quote, OrderRequest::amount(cash))?;
        } else {
            debug!(timestamp = %quote.timestamp, cash, "No cash available to open long");
        }
        self.position = Position::Long;
        Ok(())
    }

    fn go_short(&mut self, quote: &PriceObservation) -> Result<()> {
        if self.position == Position::Long {
            let units = self.account.inventory_units;
            self.sell(quote, OrderRequest::units(units))?;
        }

        let cash = self.account.cash_balance;
        let bid = quote.price - self.half_spread(quote);
        if cash <= 0.0 {
            debug!(timestamp = %quote.timestamp, cash, "No cash available to open short");
        } else if bid <= 0.0 {
            warn!(
                timestamp = %quote.timestamp,
                price = quote.price,
                spread = quote.spread,
                "Spread leaves no positive bid, not opening short"
            );
        } else {
            self.sell(quote, OrderRequest::amount(cash))?;
        }
        self.position = Position::Short;
        Ok(())
    }

    fn reset(&mut self) {
        self.account = Account::new(self.config.initial_balance);
        self.position = Position::Flat;
        self.trades.clear();
        self.frame.clear();
        self.last_quote = None;
        self.completed = None;
    }

    /// Indices of the bars inside the configured range, or the whole series.
    fn bar_range(&self) -> Range<usize> {
        let all = self.series.observations();
        match self.range {
            Some((start, end)) => {
                let lo = all.partition_point(|o| o.timestamp < start);
                let hi = all.partition_point(|o| o.timestamp <= end);
                lo..hi.max(lo)
            }
            None => 0..all.len(),
        }
    }

    fn half_spread(&self, quote: &PriceObservation) -> f64 {
        if self.spread_active {
            quote.spread / 2.0
        } else {
            0.0
        }
    }

    fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        trade_type: TradeType,
        units: f64,
        price: f64,
    ) -> TradeRecord {
        let trade = TradeRecord {
            timestamp,
            trade_type,
            units,
            price,
            cash_after: self.account.cash_balance,
            inventory_after: self.account.inventory_units,
        };
        self.trades.push(trade);
        trade
    }

    fn push_bar(&mut self, quote: &PriceObservation, short_ma: f64, long_ma: f64, signal: Signal) {
        self.frame.push(IterativeBar {
            timestamp: quote.timestamp,
            price: quote.price,
            spread: quote.spread,
            short_ma,
            long_ma,
            signal,
            position: self.position,
            cash_balance: self.account.cash_balance,
            inventory_units: self.account.inventory_units,
            nav: self.account.net_asset_value(quote.price),
        });
    }

    fn require_completed(&self) -> Result<()> {
        if self.completed.is_none() {
            return Err(Error::NoCompletedRun);
        }
        Ok(())
    }

    fn final_price(&self) -> Result<f64> {
        self.require_completed()?;
        self.last_quote
            .map(|q| q.price)
            .ok_or(Error::NoCompletedRun)
    }
}

impl Backtest for IterativeBacktester {
    fn parameters(&self) -> StrategyParameters {
        self.params
    }

    fn set_parameters(&mut self, params: StrategyParameters) -> Result<()> {
        IterativeBacktester::set_parameters(self, params)
    }

    /// Net performance in percent.
    fn evaluate(&mut self) -> Result<f64> {
        self.run().map(|r| r.net_performance_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SimpleMovingAverage;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn series_with_spread(prices: &[f64], spread: f64) -> Arc<PriceSeries> {
        let observations = prices
            .iter()
            .enumerate()
            .map(|(i, p)| PriceObservation::new(day(i as i64), *p).with_spread(spread))
            .collect();
        Arc::new(PriceSeries::new("TEST", observations).unwrap())
    }

    fn backtester(
        prices: &[f64],
        spread: f64,
        short: usize,
        long: usize,
        initial_balance: f64,
        use_spread: bool,
    ) -> IterativeBacktester {
        IterativeBacktester::new(
            series_with_spread(prices, spread),
            Arc::new(SimpleMovingAverage),
            StrategyParameters::new(short, long),
            IterativeConfig {
                initial_balance,
                use_spread,
            },
        )
        .unwrap()
    }

    const CANONICAL: [f64; 6] = [100.0, 102.0, 101.0, 105.0, 104.0, 108.0];
    const FLIPS: [f64; 6] = [10.0, 12.0, 11.0, 9.0, 10.0, 13.0];

    #[test]
    fn test_canonical_fixture() {
        let mut bt = backtester(&CANONICAL, 0.0, 2, 3, 10_000.0, false);
        let result = bt.run().unwrap();

        assert_eq!(result.trade_count, 2);
        assert_eq!(result.final_balance, 10_693.0);
        assert!((result.net_performance_pct - 6.93).abs() < 1e-9);
        assert_eq!(result.bars, 4);

        let trades = bt.trades().unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].trade_type, TradeType::Buy);
        assert_eq!(trades[0].units, 99.0);
        assert_eq!(trades[0].price, 101.0);
        assert_eq!(trades[0].cash_after, 1.0);
        assert_eq!(trades[1].trade_type, TradeType::Close);
        assert_eq!(trades[1].units, 99.0);

        let frame = bt.results().unwrap();
        assert!(frame
            .iter()
            .all(|b| (b.nav - (b.cash_balance + b.inventory_units * b.price)).abs() < 1e-9));
        assert_eq!(frame[0].nav, 10_000.0);
    }

    #[test]
    fn test_flip_closes_before_reopening() {
        let mut bt = backtester(&FLIPS, 0.0, 1, 2, 1_000.0, false);
        let result = bt.run().unwrap();

        assert_eq!(result.trade_count, 6);
        assert_eq!(result.final_balance, 1_300.0);
        assert!((result.net_performance_pct - 30.0).abs() < 1e-9);

        let trades = bt.trades().unwrap();
        let kinds: Vec<TradeType> = trades.iter().map(|t| t.trade_type).collect();
        assert_eq!(
            kinds,
            vec![
                TradeType::Buy,
                TradeType::Sell,
                TradeType::Sell,
                TradeType::Buy,
                TradeType::Buy,
                TradeType::Close,
            ]
        );

        // Long 83 @ 12, flip at 11: close 83, then short with 917 of cash.
        assert_eq!(trades[0].units, 83.0);
        assert_eq!(trades[1].units, 83.0);
        assert_eq!(trades[1].cash_after, 917.0);
        assert_eq!(trades[2].units, 83.0);
        assert_eq!(trades[2].inventory_after, -83.0);
        // Flip back at 10: cover 83, then buy 100 with 1000 of cash.
        assert_eq!(trades[3].cash_after, 1_000.0);
        assert_eq!(trades[4].units, 100.0);
        assert_eq!(trades[5].units, 100.0);
    }

    #[test]
    fn test_spread_costs() {
        let mut bt = backtester(&FLIPS, 1.0, 1, 2, 1_000.0, true);
        assert!(bt.spread_active());
        let result = bt.run().unwrap();

        assert_eq!(result.trade_count, 6);
        assert_eq!(result.final_balance, 1_000.0);

        let trades = bt.trades().unwrap();
        assert_eq!(trades[0].price, 12.5);
        assert_eq!(trades[0].units, 80.0);
        assert_eq!(trades[1].price, 10.5);
        assert_eq!(trades[5].price, 12.5);
    }

    #[test]
    fn test_spread_toggle_off_uses_mid() {
        let mut with_spread_data = backtester(&FLIPS, 1.0, 1, 2, 1_000.0, false);
        let mut no_spread_data = backtester(&FLIPS, 0.0, 1, 2, 1_000.0, true);

        assert!(!with_spread_data.spread_active());
        assert!(!no_spread_data.spread_active());
        assert_eq!(
            with_spread_data.run().unwrap().final_balance,
            no_spread_data.run().unwrap().final_balance
        );
    }

    #[test]
    fn test_terminal_close_flattens_short() {
        // Equal windows tie on every bar, so the run opens short and stays short.
        let mut bt = backtester(&CANONICAL, 0.0, 2, 2, 10_000.0, false);
        let result = bt.run().unwrap();

        assert_eq!(result.trade_count, 2);
        // Short 98 @ 102, covered @ 108.
        assert_eq!(result.final_balance, 10_000.0 - 98.0 * 6.0);

        let trades = bt.trades().unwrap();
        assert_eq!(trades.last().unwrap().trade_type, TradeType::Close);
        assert_eq!(result.trade_count, trades.len());
        assert_eq!(bt.position().unwrap(), Position::Flat);
        assert_eq!(bt.account().unwrap().inventory_units, 0.0);
    }

    #[test]
    fn test_wide_spread_skips_opening_short() {
        // Half the spread exceeds every price, so the bid is never positive.
        let mut bt = backtester(&[10.0, 9.0, 8.0, 7.0], 20.0, 1, 2, 10_000.0, true);
        let result = bt.run().unwrap();

        assert_eq!(result.final_balance, 10_000.0);
        // Only the terminal close.
        assert_eq!(result.trade_count, 1);
        assert_eq!(bt.trades().unwrap()[0].trade_type, TradeType::Close);
        assert!(bt.results().unwrap().iter().all(|b| b.inventory_units == 0.0));
    }

    #[test]
    fn test_manual_order_discards_completed_run() {
        let mut bt = backtester(&CANONICAL, 0.0, 2, 3, 10_000.0, false);
        bt.run().unwrap();

        bt.buy(&PriceObservation::new(day(10), 100.0), OrderRequest::units(5.0))
            .unwrap();

        assert!(bt.last_result().is_none());
        assert!(matches!(bt.current_balance(), Err(Error::NoCompletedRun)));
        assert!(matches!(bt.net_asset_value(), Err(Error::NoCompletedRun)));

        let rerun = bt.run().unwrap();
        assert_eq!(rerun.final_balance, 10_693.0);
        assert_eq!(bt.current_balance().unwrap(), 10_693.0);
    }

    #[test]
    fn test_reporting_requires_completed_run() {
        let bt = backtester(&CANONICAL, 0.0, 2, 3, 10_000.0, false);

        assert!(matches!(bt.account(), Err(Error::NoCompletedRun)));
        assert!(matches!(bt.current_balance(), Err(Error::NoCompletedRun)));
        assert!(matches!(bt.net_asset_value(), Err(Error::NoCompletedRun)));
        assert!(matches!(bt.position_value(), Err(Error::NoCompletedRun)));
        assert!(matches!(bt.trades(), Err(Error::NoCompletedRun)));
        assert!(bt.last_result().is_none());
    }

    #[test]
    fn test_reporting_after_run() {
        let mut bt = backtester(&CANONICAL, 0.0, 2, 3, 10_000.0, false);
        bt.run().unwrap();

        assert_eq!(bt.current_balance().unwrap(), 10_693.0);
        assert_eq!(bt.position_value().unwrap(), 0.0);
        assert_eq!(bt.net_asset_value().unwrap(), 10_693.0);
    }

    #[test]
    fn test_run_resets_state() {
        let mut bt = backtester(&FLIPS, 0.0, 1, 2, 1_000.0, false);
        let first = bt.run().unwrap();
        let second = bt.run().unwrap();

        assert_eq!(first, second);
        assert_eq!(bt.trades().unwrap().len(), 6);
    }

    #[test]
    fn test_invalid_sizing_leaves_state_untouched() {
        let mut bt = backtester(&CANONICAL, 0.0, 2, 3, 10_000.0, false);
        bt.run().unwrap();
        let before = *bt.account().unwrap();

        let quote = PriceObservation::new(day(10), 100.0);
        let both = OrderRequest {
            units: Some(1.0),
            amount: Some(100.0),
        };
        assert!(matches!(bt.buy(&quote, both), Err(Error::InvalidSizing(_))));
        assert!(matches!(
            bt.sell(&quote, OrderRequest::default()),
            Err(Error::InvalidSizing(_))
        ));

        assert_eq!(*bt.account().unwrap(), before);
    }

    #[test]
    fn test_manual_orders_conserve_nav_without_spread() {
        let mut bt = backtester(&CANONICAL, 0.0, 2, 3, 10_000.0, false);
        let quotes = [
            PriceObservation::new(day(0), 100.0),
            PriceObservation::new(day(1), 103.5),
            PriceObservation::new(day(2), 97.25),
        ];

        bt.buy(&quotes[0], OrderRequest::amount(5_000.0)).unwrap();
        let nav_before = 10_000.0 + 50.0 * (103.5 - 100.0);
        let trade = bt.sell(&quotes[1], OrderRequest::units(80.0)).unwrap();
        let nav_after = trade.cash_after + trade.inventory_after * 103.5;
        assert!((nav_before - nav_after).abs() < 1e-9);

        let trade = bt.buy(&quotes[2], OrderRequest::units(30.0)).unwrap();
        let realized = 50.0 * (103.5 - 100.0) + (-30.0) * (97.25 - 103.5);
        let nav = trade.cash_after + trade.inventory_after * 97.25;
        assert!((nav - (10_000.0 + realized)).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_data() {
        let mut bt = backtester(&[100.0, 101.0, 102.0], 0.0, 2, 3, 10_000.0, false);
        assert!(matches!(
            bt.run(),
            Err(Error::InsufficientData { bars: 3, required: 3 })
        ));
        assert!(bt.last_result().is_none());
    }

    #[test]
    fn test_range_slicing() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let mut full = backtester(&prices, 0.0, 2, 3, 10_000.0, false);
        let mut sliced = backtester(&prices, 0.0, 2, 3, 10_000.0, false).with_range(day(5), day(9));

        assert_eq!(full.run().unwrap().bars, 18);
        // Five bars in range, the first two are warm-up.
        assert_eq!(sliced.run().unwrap().bars, 3);

        let frame = sliced.results().unwrap();
        assert_eq!(frame.first().unwrap().timestamp, day(7));
        assert_eq!(frame.last().unwrap().timestamp, day(9));
    }

    #[test]
    fn test_invalid_balance_rejected() {
        let result = IterativeBacktester::new(
            series_with_spread(&CANONICAL, 0.0),
            Arc::new(SimpleMovingAverage),
            StrategyParameters::new(2, 3),
            IterativeConfig {
                initial_balance: 0.0,
                use_spread: false,
            },
        );
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }
}
