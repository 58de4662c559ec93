// tapewatch - Multi-source futures market monitor
// Aggregates quotes and news from independent sources, scores news for
// sensational framing, and resolves each cycle to a single advisory verdict.

#![deny(clippy::unwrap_used)]

pub mod advisor;
pub mod analysis;
pub mod broker;
pub mod config;
pub mod dashboard;
pub mod data;

// Re-export commonly used items
pub use analysis::{MarketAnalysis, MarketAnalyzer, Recommendation};
pub use config::Config;
pub use data::{NewsItem, Quote, QuoteBatch};
