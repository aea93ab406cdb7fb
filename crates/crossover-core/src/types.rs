//! Core domain types for the crossover backtesting system.

pub mod params;
pub mod position;
pub mod series;

pub use params::*;
pub use position::*;
pub use series::*;
