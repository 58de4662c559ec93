use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{DataError, DataResult, Quote};

/// Instruments tracked each cycle (vendor continuous-contract convention)
pub const INSTRUMENTS: &[&str] = &["ES=F", "NQ=F", "CL=F", "GC=F"];

/// Reliability assigned to this source class: generally reliable but may be delayed
pub const QUOTE_SOURCE_RELIABILITY: f64 = 0.85;

const QUOTE_SOURCE_NAME: &str = "Yahoo Finance";

/// Yahoo Finance chart API response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartBars>,
}

/// Intraday bar arrays; the vendor pads gaps with nulls
#[derive(Debug, Default, Deserialize)]
#[allow(dead_code)]
struct ChartBars {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// One fetch cycle's quotes, keyed by display symbol ("ES", "NQ", ...)
///
/// An empty map means "no data" for downstream stages, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteBatch {
    pub source: String,
    pub reliability_score: f64,
    pub quotes: HashMap<String, Quote>,
    pub timestamp: DateTime<Utc>,
}

impl QuoteBatch {
    /// Empty batch for cycles where every fetch failed
    pub fn empty() -> Self {
        Self {
            source: QUOTE_SOURCE_NAME.to_string(),
            reliability_score: QUOTE_SOURCE_RELIABILITY,
            quotes: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.quotes.is_empty()
    }
}

pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl QuoteClient {
    pub fn new(timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .user_agent("tapewatch/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(base_url: String) -> Self {
        let client = reqwest::Client::new();
        Self { client, base_url }
    }

    /// Fetch intraday statistics for every tracked instrument
    ///
    /// A per-symbol failure is logged and skipped; the batch never aborts.
    pub async fn fetch_all(&self) -> QuoteBatch {
        let mut quotes = HashMap::new();

        for symbol in INSTRUMENTS {
            match self.fetch_symbol(symbol).await {
                Ok(quote) => {
                    let display = symbol.replace("=F", "");
                    quotes.insert(display, quote);
                }
                Err(e) => {
                    tracing::warn!("Failed to get {}: {}", symbol, e);
                    continue;
                }
            }
        }

        tracing::info!("Fetched quotes for {} of {} instruments", quotes.len(), INSTRUMENTS.len());

        QuoteBatch {
            source: QUOTE_SOURCE_NAME.to_string(),
            reliability_score: QUOTE_SOURCE_RELIABILITY,
            quotes,
            timestamp: Utc::now(),
        }
    }

    /// Fetch the current session's 5-minute bars for one symbol
    async fn fetch_symbol(&self, symbol: &str) -> DataResult<Quote> {
        super::validation::validate_symbol(symbol)?;

        let url = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=5m",
            self.base_url,
            urlencoding::encode(symbol)
        );

        tracing::debug!("Quote request: GET {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(DataError::api_error(
                status_code,
                format!("Quote source rejected {}: {}", symbol, error_text),
            ));
        }

        let chart: ChartResponse = response.json().await?;

        if let Some(error) = chart.chart.error {
            return Err(DataError::parse_error(format!(
                "Quote source error payload for {}: {}",
                symbol, error
            )));
        }

        let result = chart
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| DataError::no_data(symbol.to_string()))?;

        let bars = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::no_data(symbol.to_string()))?;

        if result.timestamp.is_empty() {
            return Err(DataError::no_data(symbol.to_string()));
        }

        build_quote(symbol, &bars)
    }
}

/// Compute session statistics from null-padded bar arrays
///
/// current price = last bar close; change is measured against the first
/// bar close; high/low are session extrema across all bars.
fn build_quote(symbol: &str, bars: &ChartBars) -> DataResult<Quote> {
    let closes: Vec<f64> = bars.close.iter().filter_map(|c| *c).collect();

    let first_close = *closes.first().ok_or_else(|| DataError::no_data(symbol.to_string()))?;
    let last_close = *closes.last().ok_or_else(|| DataError::no_data(symbol.to_string()))?;

    if first_close <= 0.0 {
        return Err(DataError::parse_error(format!(
            "Non-positive opening close for {}",
            symbol
        )));
    }

    let change = last_close - first_close;
    let change_percent = (change / first_close) * 100.0;

    let volume = bars.volume.iter().filter_map(|v| *v).next_back().unwrap_or(0);

    let high = bars
        .high
        .iter()
        .filter_map(|h| *h)
        .fold(f64::NEG_INFINITY, f64::max);
    let low = bars
        .low
        .iter()
        .filter_map(|l| *l)
        .fold(f64::INFINITY, f64::min);

    // Degenerate sessions with no high/low samples fall back to the closes
    let high = if high.is_finite() { high } else { last_close };
    let low = if low.is_finite() { low } else { last_close };

    let quote = Quote {
        symbol: symbol.to_string(),
        price: last_close,
        change,
        change_percent,
        volume,
        high,
        low,
        timestamp: Utc::now(),
    };

    super::validation::validate_quote(&quote)?;

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(closes: &[Option<f64>], highs: &[Option<f64>], lows: &[Option<f64>]) -> ChartBars {
        ChartBars {
            open: closes.to_vec(),
            high: highs.to_vec(),
            low: lows.to_vec(),
            close: closes.to_vec(),
            volume: vec![Some(100); closes.len()],
        }
    }

    #[test]
    fn test_build_quote_statistics() {
        let bars = bars(
            &[Some(5000.0), Some(5010.0), Some(5040.0)],
            &[Some(5005.0), Some(5050.0), Some(5045.0)],
            &[Some(4995.0), Some(5008.0), Some(5030.0)],
        );

        let quote = build_quote("ES=F", &bars).unwrap();
        assert!((quote.price - 5040.0).abs() < 1e-9);
        assert!((quote.change - 40.0).abs() < 1e-9);
        assert!((quote.change_percent - 0.8).abs() < 1e-9);
        assert!((quote.high - 5050.0).abs() < 1e-9);
        assert!((quote.low - 4995.0).abs() < 1e-9);
        assert_eq!(quote.volume, 100);
    }

    #[test]
    fn test_build_quote_skips_null_bars() {
        let bars = bars(
            &[None, Some(100.0), None, Some(101.0), None],
            &[None, Some(102.0), None, Some(101.5), None],
            &[None, Some(99.5), None, Some(100.5), None],
        );

        let quote = build_quote("CL=F", &bars).unwrap();
        assert!((quote.price - 101.0).abs() < 1e-9);
        assert!((quote.change - 1.0).abs() < 1e-9);
        assert!((quote.high - 102.0).abs() < 1e-9);
        assert!((quote.low - 99.5).abs() < 1e-9);
    }

    #[test]
    fn test_build_quote_empty_session_is_no_data() {
        let bars = ChartBars::default();
        assert!(matches!(
            build_quote("GC=F", &bars),
            Err(DataError::NoData { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_isolates_unreachable_source() {
        // Nothing listens here; every symbol fails and the batch stays empty
        let client = QuoteClient::with_base_url("http://127.0.0.1:9".to_string());
        let batch = client.fetch_all().await;
        assert!(!batch.has_data());
        assert!((batch.reliability_score - QUOTE_SOURCE_RELIABILITY).abs() < 1e-9);
    }
}
