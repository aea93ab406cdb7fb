//! Backtester
//!
//! Moving-average crossover backtesting over a single price series.
//!
//! # Features
//!
//! - **Signal Generation**: Simple and exponential moving-average crossovers
//! - **Vectorized Backtester**: Whole-series log-return simulation
//! - **Iterative Backtester**: Bar-by-bar replay with cash, inventory and spread costs
//! - **Parameter Optimizer**: Exhaustive window grid search, sequential or on the rayon pool
//!
//! # Example
//!
//! ```ignore
//! use backtester::{ParameterOptimizer, SimpleMovingAverage, VectorizedBacktester};
//! use crossover_core::types::{GridRange, StrategyParameters};
//!
//! let params = StrategyParameters::new(50, 200);
//! let mut bt = VectorizedBacktester::new(series, Arc::new(SimpleMovingAverage), params)?;
//! let result = bt.run()?;
//! println!("{}", result);
//!
//! let optimizer =
//!     ParameterOptimizer::new(GridRange::new(10, 50, 10), GridRange::new(100, 260, 20))?;
//! let best = optimizer.optimize(&mut bt)?;
//! println!("Best: {} -> {}", best.best_parameters, best.best_performance);
//! ```

pub mod account;
pub mod iterative;
pub mod optimizer;
pub mod signal;
pub mod vectorized;

// Re-exports
pub use account::{Account, OrderRequest, TradeRecord, TradeType};
pub use iterative::{IterativeBacktester, IterativeBar, IterativeConfig, IterativeResult};
pub use optimizer::{optimize, Backtest, GridPoint, OptimizationResult, ParameterOptimizer};
pub use signal::{
    crossover, generator_for, ExponentialMovingAverage, SignalGenerator, SimpleMovingAverage,
};
pub use vectorized::{VectorizedBacktester, VectorizedBar, VectorizedResult, REPORT_DECIMALS};
