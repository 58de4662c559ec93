//! Single forward-pass analysis cycle
//! Coordinates the pipeline: quotes + news -> summary + alerts -> recommendation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::recommend::{derive_alerts, recommend, ManipulationAlert, Recommendation};
use super::summary::{summarize, MarketSummary};
use crate::data::{NewsClient, NewsItem, QuoteBatch, QuoteClient};

/// Everything one cycle produced, terminal recommendation included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub timestamp: DateTime<Utc>,
    pub quotes: QuoteBatch,
    pub news: Vec<NewsItem>,
    pub market_summary: MarketSummary,
    pub manipulation_alerts: Vec<ManipulationAlert>,
    pub recommendation: Recommendation,
}

/// Runs the full pipeline on demand; holds no state between cycles
pub struct MarketAnalyzer {
    quote_client: QuoteClient,
    news_client: NewsClient,
}

impl MarketAnalyzer {
    pub fn new(timeout_seconds: u64) -> Self {
        Self {
            quote_client: QuoteClient::new(timeout_seconds),
            news_client: NewsClient::new(timeout_seconds),
        }
    }

    /// Execute one analysis pass
    ///
    /// The two fetches are independent and run concurrently; each source
    /// carries its own timeout, so a stalled feed cannot block the cycle
    /// indefinitely. The pass itself never fails: empty inputs degrade to
    /// a no-data summary and a HOLD recommendation.
    pub async fn analyze(&self) -> MarketAnalysis {
        info!("Starting market analysis cycle");

        let (quotes, news) = tokio::join!(self.quote_client.fetch_all(), self.news_client.fetch_all());

        let analysis = combine(quotes, news);

        info!(
            action = ?analysis.recommendation.action,
            alerts = analysis.manipulation_alerts.len(),
            instruments = analysis.quotes.quotes.len(),
            "Market analysis cycle complete"
        );

        analysis
    }
}

/// Join the two fetched batches into the terminal analysis
///
/// Pure given its inputs; exposed so the join stage is testable without
/// network access.
pub fn combine(quotes: QuoteBatch, news: Vec<NewsItem>) -> MarketAnalysis {
    let market_summary = summarize(&quotes);
    let manipulation_alerts = derive_alerts(&news);
    let recommendation = recommend(&market_summary, &manipulation_alerts);

    MarketAnalysis {
        timestamp: Utc::now(),
        quotes,
        news,
        market_summary,
        manipulation_alerts,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::recommend::Action;
    use crate::data::news::score_entry;

    #[test]
    fn test_combine_with_no_inputs_resolves_to_hold() {
        let analysis = combine(QuoteBatch::empty(), Vec::new());
        assert!(!analysis.market_summary.has_data());
        assert_eq!(analysis.recommendation.action, Action::Hold);
        assert_eq!(analysis.recommendation.confidence, None);
    }

    #[test]
    fn test_combine_carries_alerts_into_recommendation() {
        let news = vec![score_entry(
            "UNPRECEDENTED HISTORIC EMERGENCY CRASH!!! SHOCKING CRISIS".to_string(),
            "MOON ROCKET BUBBLE, never seen before!!!".to_string(),
            "https://example-blog.net/feed",
            None,
        )];

        let analysis = combine(QuoteBatch::empty(), news);
        // No quote data still wins the precedence race: rule 1 fires first
        assert_eq!(analysis.recommendation.action, Action::Hold);
        assert_eq!(analysis.manipulation_alerts.len(), 1);
    }
}
