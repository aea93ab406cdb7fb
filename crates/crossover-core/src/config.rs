//! Configuration management for the crossover backtester.

use crate::types::{EngineKind, GridRange, Smoothing, StrategyParameters};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Prefix for environment variables.
pub const ENV_PREFIX: &str = "CROSSOVER";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instrument symbol used for labelling.
    pub symbol: String,
    pub engine: EngineKind,
    pub smoothing: Smoothing,
    pub strategy: StrategyParameters,
    pub account: AccountConfig,
    pub optimizer: OptimizerConfig,
}

/// Iterative engine account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Starting cash balance.
    pub initial_balance: f64,
    /// Charge half the bid/ask spread on every order.
    pub use_spread: bool,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            use_spread: true,
        }
    }
}

/// Parameter grid for the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub short_range: GridRange,
    pub long_range: GridRange,
    /// Evaluate grid points on the rayon thread pool.
    pub parallel: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            short_range: GridRange::new(10, 50, 10),
            long_range: GridRange::new(100, 260, 20),
            parallel: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "UNKNOWN".to_string(),
            engine: EngineKind::default(),
            smoothing: Smoothing::default(),
            strategy: StrategyParameters::new(50, 200),
            account: AccountConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults; malformed values are errors.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            symbol: env::var("CROSSOVER_SYMBOL").unwrap_or(defaults.symbol),
            engine: parse_var("CROSSOVER_ENGINE")?.unwrap_or(defaults.engine),
            smoothing: parse_var("CROSSOVER_SMOOTHING")?.unwrap_or(defaults.smoothing),
            strategy: StrategyParameters {
                short_window: parse_var("CROSSOVER_SHORT_WINDOW")?
                    .unwrap_or(defaults.strategy.short_window),
                long_window: parse_var("CROSSOVER_LONG_WINDOW")?
                    .unwrap_or(defaults.strategy.long_window),
            },
            account: AccountConfig {
                initial_balance: parse_var("CROSSOVER_INITIAL_BALANCE")?
                    .unwrap_or(defaults.account.initial_balance),
                use_spread: parse_var("CROSSOVER_USE_SPREAD")?
                    .unwrap_or(defaults.account.use_spread),
            },
            optimizer: OptimizerConfig {
                short_range: range_var("CROSSOVER_SHORT_RANGE")?
                    .unwrap_or(defaults.optimizer.short_range),
                long_range: range_var("CROSSOVER_LONG_RANGE")?
                    .unwrap_or(defaults.optimizer.long_range),
                parallel: parse_var("CROSSOVER_PARALLEL")?.unwrap_or(defaults.optimizer.parallel),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (TOML, YAML or JSON by extension),
    /// with `CROSSOVER__SECTION__KEY` environment overrides on top.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check strategy, account and optimizer settings.
    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        self.optimizer.short_range.validate()?;
        self.optimizer.long_range.validate()?;

        if !self.account.initial_balance.is_finite() || self.account.initial_balance <= 0.0 {
            return Err(Error::Config {
                message: format!(
                    "initial balance must be positive, got {}",
                    self.account.initial_balance
                ),
            });
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|e| Error::Config {
            message: format!("{} has invalid value {:?}: {}", name, raw, e),
        }),
        Err(_) => Ok(None),
    }
}

/// Parse a `start,stop,step` triple.
fn range_var(name: &str) -> Result<Option<GridRange>> {
    let raw = match env::var(name) {
        Ok(raw) => raw,
        Err(_) => return Ok(None),
    };

    parse_range(&raw).map(Some).map_err(|message| Error::Config {
        message: format!("{}: {}", name, message),
    })
}

/// Parse `start,stop,step` into a [`GridRange`].
pub fn parse_range(raw: &str) -> std::result::Result<GridRange, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected start,stop,step but got {:?}", raw));
    }

    let mut values = [0i64; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid integer {:?}: {}", part, e))?;
    }
    Ok(GridRange::new(values[0], values[1], values[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.account.initial_balance, 10_000.0);
        assert!(config.account.use_spread);
    }

    #[test]
    fn test_validate_rejects_bad_balance() {
        let mut config = Config::default();
        config.account.initial_balance = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_range() {
        let mut config = Config::default();
        config.optimizer.long_range = GridRange::new(5, 5, 1);
        assert!(matches!(config.validate(), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("10, 50, 5").unwrap(), GridRange::new(10, 50, 5));
        assert!(parse_range("10,50").is_err());
        assert!(parse_range("a,50,5").is_err());
    }

    #[test]
    fn test_config_deserializes_partial_json() {
        let json = r#"{"engine":"iterative","strategy":{"short_window":5,"long_window":20}}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.engine, EngineKind::Iterative);
        assert_eq!(config.strategy, StrategyParameters::new(5, 20));
        assert_eq!(config.smoothing, Smoothing::Exponential);
        assert_eq!(config.account.initial_balance, 10_000.0);
    }
}
