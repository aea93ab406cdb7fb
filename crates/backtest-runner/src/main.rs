//! Backtest Runner
//!
//! Loads a price series from JSON and runs a crossover backtest, a grid
//! search over window lengths, or buy-and-hold statistics.

mod report;

use anyhow::{Context, Result};
use backtester::{
    generator_for, IterativeBacktester, IterativeConfig, ParameterOptimizer, SignalGenerator,
    VectorizedBacktester,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use crossover_core::config::{parse_range, Config};
use crossover_core::stats::ReturnStats;
use crossover_core::types::{EngineKind, GridRange, PriceSeries, Smoothing, StrategyParameters};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use report::Report;

#[derive(Parser)]
#[command(name = "backtest-runner")]
#[command(about = "Backtest moving-average crossover strategies on a price series")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Price series JSON file
    #[arg(short, long)]
    prices: PathBuf,

    /// Config file (TOML, YAML or JSON); environment variables are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backtesting engine
    #[arg(long)]
    engine: Option<EngineKind>,

    /// Moving-average smoothing
    #[arg(long)]
    smoothing: Option<Smoothing>,

    /// First bar to include (RFC 3339)
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Last bar to include (RFC 3339)
    #[arg(long)]
    end: Option<DateTime<Utc>>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single backtest
    Run {
        /// Short moving-average window
        #[arg(long)]
        short: Option<usize>,

        /// Long moving-average window
        #[arg(long)]
        long: Option<usize>,
    },
    /// Grid-search the window lengths
    Optimize {
        /// Short window range as start,stop,step
        #[arg(long, value_parser = parse_range)]
        short_range: Option<GridRange>,

        /// Long window range as start,stop,step
        #[arg(long, value_parser = parse_range)]
        long_range: Option<GridRange>,

        /// Evaluate grid points in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// Show buy-and-hold return statistics
    Stats,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "backtest_runner=info,backtester=info,crossover_core=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::from_env()?,
    };
    if let Some(engine) = cli.engine {
        config.engine = engine;
    }
    if let Some(smoothing) = cli.smoothing {
        config.smoothing = smoothing;
    }

    let series = load_series(&cli)?;
    config.symbol = series.symbol().to_string();

    info!(
        symbol = %config.symbol,
        bars = series.len(),
        engine = %config.engine,
        smoothing = %config.smoothing,
        "Starting backtest runner"
    );

    let report = match cli.command {
        Commands::Run { short, long } => {
            if let Some(short) = short {
                config.strategy.short_window = short;
            }
            if let Some(long) = long {
                config.strategy.long_window = long;
            }
            run_backtest(&config, series)?
        }
        Commands::Optimize {
            short_range,
            long_range,
            parallel,
        } => {
            if let Some(range) = short_range {
                config.optimizer.short_range = range;
            }
            if let Some(range) = long_range {
                config.optimizer.long_range = range;
            }
            config.optimizer.parallel |= parallel;
            run_optimizer(&config, series)?
        }
        Commands::Stats => {
            let stats = ReturnStats::from_series(&series)
                .context("At least two defined returns are needed for statistics")?;
            Report::Stats(stats)
        }
    };

    report.print(cli.json)?;
    Ok(())
}

fn load_series(cli: &Cli) -> Result<Arc<PriceSeries>> {
    let series = PriceSeries::from_json_file(&cli.prices)
        .with_context(|| format!("Failed to load prices from {}", cli.prices.display()))?;

    let series = match (cli.start, cli.end) {
        (None, None) => series,
        (start, end) => {
            let start = start.unwrap_or(DateTime::<Utc>::MIN_UTC);
            let end = end.unwrap_or(DateTime::<Utc>::MAX_UTC);
            let sliced = series.between(start, end);
            if sliced.is_empty() {
                warn!(%start, %end, "No bars inside the requested range");
            }
            sliced
        }
    };

    Ok(Arc::new(series))
}

fn run_backtest(config: &Config, series: Arc<PriceSeries>) -> Result<Report> {
    let generator = generator_for(config.smoothing);
    let params = config.strategy;

    match config.engine {
        EngineKind::Vectorized => {
            let mut bt = VectorizedBacktester::new(series, generator, params)?;
            Ok(Report::Vectorized(bt.run()?))
        }
        EngineKind::Iterative => {
            let mut bt = iterative(config, series, generator, params)?;
            let result = bt.run()?;
            Ok(Report::Iterative {
                result,
                trades: bt.trades()?.to_vec(),
            })
        }
    }
}

fn run_optimizer(config: &Config, series: Arc<PriceSeries>) -> Result<Report> {
    let generator = generator_for(config.smoothing);
    let optimizer =
        ParameterOptimizer::new(config.optimizer.short_range, config.optimizer.long_range)?;
    let parallel = config.optimizer.parallel;

    let result = match config.engine {
        EngineKind::Vectorized => {
            let mut bt = VectorizedBacktester::new(series, generator, config.strategy)?;
            if parallel {
                optimizer.optimize_parallel(&mut bt)?
            } else {
                optimizer.optimize(&mut bt)?
            }
        }
        EngineKind::Iterative => {
            let mut bt = iterative(config, series, generator, config.strategy)?;
            if parallel {
                optimizer.optimize_parallel(&mut bt)?
            } else {
                optimizer.optimize(&mut bt)?
            }
        }
    };

    Ok(Report::Optimization(result))
}

fn iterative(
    config: &Config,
    series: Arc<PriceSeries>,
    generator: Arc<dyn SignalGenerator>,
    params: StrategyParameters,
) -> Result<IterativeBacktester> {
    Ok(IterativeBacktester::new(
        series,
        generator,
        params,
        IterativeConfig::from(&config.account),
    )?)
}
