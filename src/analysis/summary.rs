//! Aggregates per-instrument quote statistics into an overall
//! sentiment classification

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::data::QuoteBatch;

/// Per-instrument change threshold, in percent
const INSTRUMENT_THRESHOLD_PCT: f64 = 0.5;

/// Bullish-ratio split for the overall classification
const BULLISH_RATIO_HIGH: f64 = 0.6;
const BULLISH_RATIO_LOW: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// One instrument's contribution to the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub sentiment: Sentiment,
    pub change_percent: f64,
    /// Move magnitude, |change_percent|
    pub strength: f64,
}

/// Derived purely from the current batch of quotes; no cross-cycle memory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarketSummary {
    /// Every quote fetch failed this cycle
    NoData,
    Available {
        overall_sentiment: Sentiment,
        instruments: HashMap<String, InstrumentSummary>,
        /// Average |change_percent| across instruments with data
        market_strength: f64,
    },
}

impl MarketSummary {
    pub fn has_data(&self) -> bool {
        matches!(self, MarketSummary::Available { .. })
    }

    /// Average move magnitude, None when the cycle had no data
    pub fn market_strength(&self) -> Option<f64> {
        match self {
            MarketSummary::Available { market_strength, .. } => Some(*market_strength),
            MarketSummary::NoData => None,
        }
    }

    pub fn overall_sentiment(&self) -> Option<Sentiment> {
        match self {
            MarketSummary::Available { overall_sentiment, .. } => Some(*overall_sentiment),
            MarketSummary::NoData => None,
        }
    }
}

/// Classify one instrument's session move
pub fn classify(change_percent: f64) -> Sentiment {
    if change_percent > INSTRUMENT_THRESHOLD_PCT {
        Sentiment::Bullish
    } else if change_percent < -INSTRUMENT_THRESHOLD_PCT {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// Classify the market from its bullish ratio; the inclusive band
/// [0.4, 0.6] stays Neutral
pub fn overall(bullish_ratio: f64) -> Sentiment {
    if bullish_ratio > BULLISH_RATIO_HIGH {
        Sentiment::Bullish
    } else if bullish_ratio < BULLISH_RATIO_LOW {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// Summarize the cycle's quote batch
pub fn summarize(batch: &QuoteBatch) -> MarketSummary {
    if !batch.has_data() {
        return MarketSummary::NoData;
    }

    let mut instruments = HashMap::new();
    let mut bullish_count = 0usize;
    let mut total_strength = 0.0;

    for (symbol, quote) in &batch.quotes {
        let sentiment = classify(quote.change_percent);
        if sentiment == Sentiment::Bullish {
            bullish_count += 1;
        }

        total_strength += quote.change_percent.abs();

        instruments.insert(
            symbol.clone(),
            InstrumentSummary {
                sentiment,
                change_percent: quote.change_percent,
                strength: quote.change_percent.abs(),
            },
        );
    }

    let total = instruments.len();
    let bullish_ratio = bullish_count as f64 / total as f64;

    MarketSummary::Available {
        overall_sentiment: overall(bullish_ratio),
        instruments,
        market_strength: total_strength / total as f64,
    }
}
