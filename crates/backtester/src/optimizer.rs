//! Exhaustive grid search over crossover window lengths.

use crossover_core::types::{GridRange, StrategyParameters};
use crossover_core::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// An engine the optimizer can drive.
#[cfg_attr(test, mockall::automock)]
pub trait Backtest {
    /// Parameters of the next run.
    fn parameters(&self) -> StrategyParameters;

    /// Replace the window lengths in place.
    fn set_parameters(&mut self, params: StrategyParameters) -> Result<()>;

    /// Run once and return the scalar performance metric.
    fn evaluate(&mut self) -> Result<f64>;
}

/// Performance of one grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub parameters: StrategyParameters,
    pub performance: f64,
}

/// Outcome of a grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best_parameters: StrategyParameters,
    pub best_performance: f64,
    /// Every grid point in enumeration order.
    pub all_results: Vec<GridPoint>,
}

impl OptimizationResult {
    /// Performance recorded for `params`, if it was on the grid.
    pub fn performance_of(&self, params: StrategyParameters) -> Option<f64> {
        self.all_results
            .iter()
            .find(|p| p.parameters == params)
            .map(|p| p.performance)
    }
}

/// Grid search over `(short_window, long_window)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterOptimizer {
    short_range: GridRange,
    long_range: GridRange,
}

impl ParameterOptimizer {
    pub fn new(short_range: GridRange, long_range: GridRange) -> Result<Self> {
        short_range.validate()?;
        long_range.validate()?;
        Ok(Self {
            short_range,
            long_range,
        })
    }

    /// Grid points, row-major: short window outer, long window inner.
    pub fn grid(&self) -> Result<Vec<StrategyParameters>> {
        let shorts = self.short_range.windows()?;
        let longs = self.long_range.windows()?;

        Ok(shorts
            .iter()
            .flat_map(|s| longs.iter().map(move |l| StrategyParameters::new(*s, *l)))
            .collect())
    }

    /// Evaluate every grid point on `backtester`, then leave it configured
    /// with, and holding the results of, the best point.
    pub fn optimize<B: Backtest + ?Sized>(
        &self,
        backtester: &mut B,
    ) -> Result<OptimizationResult> {
        let grid = self.grid()?;
        info!(points = grid.len(), "Starting parameter optimization");

        let mut all_results = Vec::with_capacity(grid.len());
        for params in grid {
            backtester.set_parameters(params)?;
            let performance = backtester.evaluate()?;
            debug!(
                short = params.short_window,
                long = params.long_window,
                performance,
                "Grid point evaluated"
            );
            all_results.push(GridPoint {
                parameters: params,
                performance,
            });
        }

        finish(backtester, all_results)
    }

    /// Like [`optimize`](Self::optimize), with grid points spread across the
    /// rayon pool. Each worker runs its own clone of `backtester`.
    pub fn optimize_parallel<B>(&self, backtester: &mut B) -> Result<OptimizationResult>
    where
        B: Backtest + Clone + Send + Sync,
    {
        let grid = self.grid()?;
        info!(
            points = grid.len(),
            threads = rayon::current_num_threads(),
            "Starting parallel parameter optimization"
        );

        let template = backtester.clone();
        let performances: Vec<Result<f64>> = grid
            .par_iter()
            .map_init(
                || template.clone(),
                |worker, params| {
                    worker.set_parameters(*params)?;
                    worker.evaluate()
                },
            )
            .collect();

        let all_results = grid
            .into_iter()
            .zip(performances)
            .map(|(parameters, performance)| {
                performance.map(|performance| GridPoint {
                    parameters,
                    performance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        finish(backtester, all_results)
    }
}

/// Run a sequential grid search.
pub fn optimize<B: Backtest + ?Sized>(
    short_range: GridRange,
    long_range: GridRange,
    backtester: &mut B,
) -> Result<OptimizationResult> {
    ParameterOptimizer::new(short_range, long_range)?.optimize(backtester)
}

/// Index of the best point: strictly greater wins, so the first of equal
/// points is kept. NaN never beats a number.
fn best_index(points: &[GridPoint]) -> usize {
    let mut best = 0;
    for (i, point) in points.iter().enumerate().skip(1) {
        let current = points[best].performance;
        if point.performance > current || (current.is_nan() && !point.performance.is_nan()) {
            best = i;
        }
    }
    best
}

fn finish<B: Backtest + ?Sized>(
    backtester: &mut B,
    all_results: Vec<GridPoint>,
) -> Result<OptimizationResult> {
    let best = all_results[best_index(&all_results)];

    backtester.set_parameters(best.parameters)?;
    backtester.evaluate()?;

    info!(
        short = best.parameters.short_window,
        long = best.parameters.long_window,
        performance = best.performance,
        "Optimization completed"
    );

    Ok(OptimizationResult {
        best_parameters: best.parameters,
        best_performance: best.performance,
        all_results,
    })
}
