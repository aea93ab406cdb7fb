//! MA Crossover: Moving-Average Crossover Backtesting
//!
//! This is the root crate that provides benchmark and integration-test access
//! to the workspace crates. For actual functionality, use the individual
//! crates directly:
//!
//! - `crossover-core`: Price series, strategy parameters, statistics, configuration
//! - `backtester`: Signal generation, vectorized and iterative engines, optimizer
//! - `backtest-runner`: Command-line runner

// Re-export for benchmarks
pub use backtester as engine;
pub use crossover_core as core;
