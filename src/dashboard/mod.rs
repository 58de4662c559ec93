//! Dashboard application state
//!
//! An explicit state struct passed into each render/update call, replacing
//! ambient session state. All mutation goes through the entry points
//! defined here; metrics are derived, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{DataError, DataResult, QuoteBatch};

/// Alerts kept in the rolling log
const MAX_ALERTS: usize = 20;

/// Funded-account evaluation presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountPreset {
    Combine50k,
    Combine100k,
    Combine150k,
}

/// Evaluation rules for one preset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub account_size: f64,
    pub profit_target: f64,
    pub daily_loss_limit: f64,
    pub max_total_loss: f64,
    pub max_position_size: i64,
}

impl AccountPreset {
    pub fn profile(&self) -> AccountProfile {
        match self {
            AccountPreset::Combine50k => AccountProfile {
                account_size: 50_000.0,
                profit_target: 3_000.0,
                daily_loss_limit: 2_000.0,
                max_total_loss: 2_500.0,
                max_position_size: 5,
            },
            AccountPreset::Combine100k => AccountProfile {
                account_size: 100_000.0,
                profit_target: 6_000.0,
                daily_loss_limit: 3_000.0,
                max_total_loss: 4_000.0,
                max_position_size: 10,
            },
            AccountPreset::Combine150k => AccountProfile {
                account_size: 150_000.0,
                profit_target: 9_000.0,
                daily_loss_limit: 4_500.0,
                max_total_loss: 6_000.0,
                max_position_size: 15,
            },
        }
    }
}

impl std::str::FromStr for AccountPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "50K" | "50K_COMBINE" => Ok(AccountPreset::Combine50k),
            "100K" | "100K_COMBINE" => Ok(AccountPreset::Combine100k),
            "150K" | "150K_COMBINE" => Ok(AccountPreset::Combine150k),
            other => Err(format!("Unknown account preset: {}", other)),
        }
    }
}

/// Dollar value of one point of price movement
pub fn point_value(symbol: &str) -> f64 {
    match symbol {
        "NQ" => 20.0,
        "ES" => 50.0,
        "CL" => 1000.0,
        "GC" => 100.0,
        _ => 50.0,
    }
}

/// A simulated open position; negative quantity is short
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub symbol: String,
    pub quantity: i64,
    pub entry_price: f64,
    pub current_price: f64,
    pub unrealized_pnl: f64,
    pub opened_at: DateTime<Utc>,
}

impl OpenPosition {
    /// Re-mark against a new price
    fn mark(&mut self, price: f64) {
        self.current_price = price;
        let pv = point_value(&self.symbol);

        if self.quantity > 0 {
            self.unrealized_pnl = (self.current_price - self.entry_price) * self.quantity as f64 * pv;
        } else {
            self.unrealized_pnl =
                (self.entry_price - self.current_price) * self.quantity.unsigned_abs() as f64 * pv;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardAlert {
    pub message: String,
    pub level: AlertLevel,
    pub timestamp: DateTime<Utc>,
}

/// Metrics derived from the current state for one render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub current_balance: f64,
    pub total_pnl: f64,
    pub daily_pnl: f64,
    pub unrealized_pnl: f64,
    /// Percent of the profit target reached
    pub profit_target_progress: f64,
    /// Percent of the daily loss limit consumed
    pub daily_loss_used: f64,
    pub position_count: usize,
    pub trade_count: usize,
    pub last_update: DateTime<Utc>,
}

/// The dashboard's entire mutable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardState {
    pub account: AccountPreset,
    pub positions: Vec<OpenPosition>,
    /// Realized P&L for the current session day
    pub daily_pnl: f64,
    /// Realized P&L since evaluation start
    pub total_pnl: f64,
    pub alerts: Vec<DashboardAlert>,
    pub trade_count: usize,
}

impl DashboardState {
    pub fn new(account: AccountPreset) -> Self {
        Self {
            account,
            positions: Vec::new(),
            daily_pnl: 0.0,
            total_pnl: 0.0,
            alerts: Vec::new(),
            trade_count: 0,
        }
    }

    /// Open a simulated position, enforcing the preset's size limit
    pub fn open_position(&mut self, symbol: &str, quantity: i64, entry_price: f64) -> DataResult<()> {
        if quantity == 0 {
            return Err(DataError::validation_error("quantity", "Quantity cannot be zero"));
        }

        let profile = self.account.profile();
        let contracts_open: i64 = self.positions.iter().map(|p| p.quantity.abs()).sum();
        if contracts_open + quantity.abs() > profile.max_position_size {
            return Err(DataError::validation_error(
                "quantity",
                "Position size limit exceeded for account preset",
            ));
        }

        let mut position = OpenPosition {
            symbol: symbol.to_string(),
            quantity,
            entry_price,
            current_price: entry_price,
            unrealized_pnl: 0.0,
            opened_at: Utc::now(),
        };
        position.mark(entry_price);

        self.positions.push(position);
        Ok(())
    }

    /// Close a position by symbol, realizing its P&L
    pub fn close_position(&mut self, symbol: &str) -> DataResult<f64> {
        let index = self
            .positions
            .iter()
            .position(|p| p.symbol == symbol)
            .ok_or_else(|| DataError::no_data(format!("open position in {}", symbol)))?;

        let position = self.positions.remove(index);
        let realized = position.unrealized_pnl;

        self.daily_pnl += realized;
        self.total_pnl += realized;
        self.trade_count += 1;

        Ok(realized)
    }

    /// Re-mark every open position against the latest quote batch
    ///
    /// Symbols absent from the batch keep their previous mark.
    pub fn mark_to_market(&mut self, batch: &QuoteBatch) {
        for position in &mut self.positions {
            if let Some(quote) = batch.quotes.get(&position.symbol) {
                position.mark(quote.price);
            }
        }
    }

    /// Append to the rolling alert log, dropping the oldest past the cap
    pub fn push_alert(&mut self, message: &str, level: AlertLevel) {
        self.alerts.push(DashboardAlert {
            message: message.to_string(),
            level,
            timestamp: Utc::now(),
        });

        if self.alerts.len() > MAX_ALERTS {
            let excess = self.alerts.len() - MAX_ALERTS;
            self.alerts.drain(..excess);
        }
    }

    /// Derive the metrics for one render
    pub fn live_metrics(&self) -> LiveMetrics {
        let profile = self.account.profile();

        let unrealized_pnl: f64 = self.positions.iter().map(|p| p.unrealized_pnl).sum();
        let daily_pnl = self.daily_pnl + unrealized_pnl;
        let total_pnl = self.total_pnl + unrealized_pnl;

        LiveMetrics {
            current_balance: profile.account_size + total_pnl,
            total_pnl,
            daily_pnl,
            unrealized_pnl,
            profit_target_progress: (total_pnl / profile.profit_target) * 100.0,
            daily_loss_used: daily_pnl.min(0.0).abs() / profile.daily_loss_limit * 100.0,
            position_count: self.positions.len(),
            trade_count: self.trade_count,
            last_update: Utc::now(),
        }
    }
}
