//! Data layer for fetching market quotes and news from external sources
//! Provides per-source failure isolation and data validation

pub mod errors;
pub mod news;
pub mod quotes;

// Re-export commonly used types
pub use errors::{DataError, DataResult};
pub use news::NewsClient;
pub use quotes::{QuoteBatch, QuoteClient};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-instrument intraday statistics for one fetch cycle
///
/// Immutable once produced; owned by the fetch call that created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: i64,
    pub high: f64,
    pub low: f64,
    pub timestamp: DateTime<Utc>,
}

/// A harvested news entry, scored at harvest time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    /// Feed URL the entry came from
    pub source: String,
    pub published: Option<String>,
    /// Sensational-framing heuristic, 0.0 (authentic) to 1.0 (suspect)
    pub manipulation_score: f64,
    /// Source trust weight, 0.0 to 1.0
    pub reliability_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Validation helpers
pub mod validation {
    use super::*;

    /// Validate a vendor ticker symbol (continuous-contract convention, e.g. "ES=F")
    pub fn validate_symbol(symbol: &str) -> DataResult<()> {
        if symbol.is_empty() {
            return Err(DataError::validation_error("symbol", "Symbol cannot be empty"));
        }

        if symbol.len() > 10 {
            return Err(DataError::validation_error("symbol", "Symbol too long (max 10 chars)"));
        }

        if !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '=' || c == '^') {
            return Err(DataError::validation_error(
                "symbol",
                "Symbol must contain only letters, digits, '=' or '^'",
            ));
        }

        Ok(())
    }

    /// Validate a unit-interval score (manipulation, reliability, confidence)
    pub fn validate_score(field: &str, score: f64) -> DataResult<()> {
        if !(0.0..=1.0).contains(&score) {
            return Err(DataError::validation_error(
                field,
                "Score must be between 0.0 and 1.0",
            ));
        }
        Ok(())
    }

    /// Validate quote statistics
    pub fn validate_quote(quote: &Quote) -> DataResult<()> {
        validate_symbol(&quote.symbol)?;

        if quote.price <= 0.0 {
            return Err(DataError::validation_error("price", "Price must be positive"));
        }

        if quote.volume < 0 {
            return Err(DataError::validation_error("volume", "Volume cannot be negative"));
        }

        if quote.high < quote.low {
            return Err(DataError::validation_error(
                "high_low",
                "Session high cannot be less than session low",
            ));
        }

        Ok(())
    }
}
