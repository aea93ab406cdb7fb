//! Cash and inventory accounting for the iterative engine.

use chrono::{DateTime, Utc};
use crossover_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cash, inventory and trade count of a single-instrument account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub cash_balance: f64,
    /// Signed units held; negative when short.
    pub inventory_units: f64,
    pub trade_count: usize,
}

impl Account {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            cash_balance: initial_balance,
            inventory_units: 0.0,
            trade_count: 0,
        }
    }

    /// Marked-to-market value of the inventory.
    pub fn position_value(&self, price: f64) -> f64 {
        self.inventory_units * price
    }

    /// Cash plus marked-to-market inventory.
    pub fn net_asset_value(&self, price: f64) -> f64 {
        self.cash_balance + self.position_value(price)
    }
}

/// Order size, either explicit units or a notional amount.
///
/// Exactly one of the two must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub units: Option<f64>,
    pub amount: Option<f64>,
}

impl OrderRequest {
    pub fn units(units: f64) -> Self {
        Self {
            units: Some(units),
            amount: None,
        }
    }

    pub fn amount(amount: f64) -> Self {
        Self {
            units: None,
            amount: Some(amount),
        }
    }

    /// Units to trade at `execution_price`; amounts are floored to whole units.
    pub fn resolve_units(&self, execution_price: f64) -> Result<f64> {
        match (self.units, self.amount) {
            (Some(_), Some(_)) => Err(Error::InvalidSizing(
                "specify either units or amount, not both".to_string(),
            )),
            (None, None) => Err(Error::InvalidSizing(
                "either units or amount is required".to_string(),
            )),
            (Some(units), None) => {
                if !units.is_finite() || units < 0.0 {
                    return Err(Error::InvalidSizing(format!(
                        "units must be finite and non-negative, got {}",
                        units
                    )));
                }
                Ok(units)
            }
            (None, Some(amount)) => {
                if !amount.is_finite() || amount < 0.0 {
                    return Err(Error::InvalidSizing(format!(
                        "amount must be finite and non-negative, got {}",
                        amount
                    )));
                }
                if execution_price.is_nan() || execution_price <= 0.0 {
                    return Err(Error::InvalidSizing(format!(
                        "cannot size {} by amount at execution price {}",
                        amount, execution_price
                    )));
                }
                Ok((amount / execution_price).floor())
            }
        }
    }
}

/// Kind of executed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
    /// Terminal close of whatever inventory remains.
    Close,
}

/// Record of an order executed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub trade_type: TradeType,
    /// Units traded; signed inventory for a terminal close.
    pub units: f64,
    /// Execution price including any half-spread cost.
    pub price: f64,
    pub cash_after: f64,
    pub inventory_after: f64,
}
