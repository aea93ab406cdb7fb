//! Result printing for the runner.

use anyhow::Result;
use backtester::{IterativeResult, OptimizationResult, TradeRecord, VectorizedResult};
use crossover_core::stats::ReturnStats;
use serde::Serialize;

/// Outcome of one runner command.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Vectorized(VectorizedResult),
    Iterative {
        result: IterativeResult,
        trades: Vec<TradeRecord>,
    },
    Optimization(OptimizationResult),
    Stats(ReturnStats),
}

impl Report {
    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        match self {
            Self::Vectorized(result) => {
                println!("{}", result);
            }
            Self::Iterative { result, trades } => {
                for trade in trades {
                    println!(
                        "{} | {:?} {} units at {:.5} | cash {:.2}",
                        trade.timestamp,
                        trade.trade_type,
                        trade.units,
                        trade.price,
                        trade.cash_after
                    );
                }
                println!("{}", "=".repeat(75));
                println!("{}", result);
                println!("{}", "=".repeat(75));
            }
            Self::Optimization(result) => {
                println!(
                    "Best: {} | performance = {}",
                    result.best_parameters, result.best_performance
                );
                println!("Grid points evaluated: {}", result.all_results.len());
            }
            Self::Stats(stats) => {
                println!("Annualized return: {}", stats.annualized_return);
                println!("Annualized risk:   {}", stats.annualized_risk);
            }
        }
        Ok(())
    }
}
