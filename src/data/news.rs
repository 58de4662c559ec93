use chrono::Utc;

use super::{DataError, DataResult, NewsItem};
use crate::analysis::manipulation;

/// Fixed syndication feed endpoints harvested each cycle
pub const NEWS_FEEDS: &[&str] = &[
    "https://feeds.finance.yahoo.com/rss/2.0/headline",
    "https://www.federalreserve.gov/feeds/press_all.xml",
    "https://www.cmegroup.com/rss/all-press-releases.xml",
];

/// Entries kept per feed, most recent first in feed order
const MAX_ENTRIES_PER_FEED: usize = 10;

pub struct NewsClient {
    client: reqwest::Client,
}

impl NewsClient {
    pub fn new(timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .user_agent("tapewatch/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Harvest and score every configured feed
    ///
    /// A feed failure is logged and isolated; the result is the
    /// concatenation of surviving feeds sorted descending by reliability
    /// (stable, so each feed's entries keep their order on ties).
    pub async fn fetch_all(&self) -> Vec<NewsItem> {
        let mut all_news = Vec::new();

        for source_url in NEWS_FEEDS {
            match self.fetch_feed(source_url).await {
                Ok(mut items) => {
                    tracing::debug!("Parsed {} entries from {}", items.len(), source_url);
                    all_news.append(&mut items);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", source_url, e);
                    continue;
                }
            }
        }

        manipulation::sort_by_reliability(&mut all_news);

        tracing::info!(
            "Harvested {} news items from {} feeds",
            all_news.len(),
            NEWS_FEEDS.len()
        );

        all_news
    }

    async fn fetch_feed(&self, source_url: &str) -> DataResult<Vec<NewsItem>> {
        let response = self.client.get(source_url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::api_error(
                response.status().as_u16(),
                format!("Feed endpoint rejected {}", source_url),
            ));
        }

        let body = response.bytes().await?;
        parse_feed_bytes(&body, source_url)
    }
}

/// Parse a feed document and score its recent entries
///
/// Pulled out of the client so malformed-document handling is testable
/// without a network.
pub fn parse_feed_bytes(bytes: &[u8], source_url: &str) -> DataResult<Vec<NewsItem>> {
    let feed = feed_rs::parser::parse(bytes)
        .map_err(|e| DataError::feed_error(source_url.to_string(), e.to_string()))?;

    let items = feed
        .entries
        .into_iter()
        .take(MAX_ENTRIES_PER_FEED)
        .map(|entry| {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let summary = entry.summary.map(|s| s.content).unwrap_or_default();
            let published = entry.published.map(|d| d.to_rfc2822());
            score_entry(title, summary, source_url, published)
        })
        .collect();

    Ok(items)
}

/// Build a scored item from one raw feed entry
///
/// Harvesting and scoring are the same step: scores are computed here,
/// never looked up later.
pub fn score_entry(
    title: String,
    summary: String,
    source_url: &str,
    published: Option<String>,
) -> NewsItem {
    let combined = format!("{} {}", title, summary);

    NewsItem {
        manipulation_score: manipulation::manipulation_score(&combined),
        reliability_score: manipulation::source_reliability(source_url),
        title,
        summary,
        source: source_url.to_string(),
        published,
        timestamp: Utc::now(),
    }
}
