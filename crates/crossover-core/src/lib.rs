//! Crossover Core Library
//!
//! Shared price-series types, return statistics, errors, and configuration
//! for the moving-average crossover backtester.

pub mod config;
pub mod error;
pub mod stats;
pub mod types;

pub use error::{Error, Result};
