//! Sensational-framing and source-trust heuristics
//!
//! The scoring formula is a frozen placeholder heuristic with no predictive
//! claim; it is kept bit-compatible with the documented behavior.

use crate::data::NewsItem;

/// Sensational keywords checked one-by-one against lowercased text
pub const MANIPULATION_KEYWORDS: &[&str] = &[
    "unprecedented",
    "never seen before",
    "historic",
    "shocking",
    "emergency",
    "crisis",
    "crash",
    "bubble",
    "moon",
    "rocket",
];

/// Domains granted the high trust tier
pub const TRUSTED_SOURCES: &[&str] = &[
    "federalreserve.gov",
    "cmegroup.com",
    "sec.gov",
    "treasury.gov",
    "reuters.com",
    "bloomberg.com",
    "wsj.com",
];

/// Score free text for sensational framing, in [0, 1]
///
/// One check per keyword (case-insensitive substring), plus one check for
/// fully upper-case text and one for excessive punctuation. The score is
/// matched checks over total checks, so the denominator is always
/// `MANIPULATION_KEYWORDS.len() + 2`.
pub fn manipulation_score(text: &str) -> f64 {
    let text_lower = text.to_lowercase();

    let mut indicators = 0usize;
    let mut total_checks = 0usize;

    for keyword in MANIPULATION_KEYWORDS {
        total_checks += 1;
        if text_lower.contains(keyword) {
            indicators += 1;
        }
    }

    if is_all_caps(text) {
        indicators += 1;
    }
    total_checks += 1;

    let exclamations = text.matches('!').count();
    let questions = text.matches('?').count();
    if exclamations > 2 || questions > 2 {
        indicators += 1;
    }
    total_checks += 1;

    if total_checks > 0 {
        indicators as f64 / total_checks as f64
    } else {
        0.0
    }
}

/// Trust weight for a source URL or domain: trusted tier 0.9, default 0.6
///
/// Any trusted-domain substring match short-circuits to the high tier;
/// no other values are possible.
pub fn source_reliability(source_url: &str) -> f64 {
    for trusted_domain in TRUSTED_SOURCES {
        if source_url.contains(trusted_domain) {
            return 0.9;
        }
    }

    0.6
}

/// Order a scored batch for display: descending reliability, ties keep
/// harvest order (stable sort)
pub fn sort_by_reliability(items: &mut [NewsItem]) {
    items.sort_by(|a, b| b.reliability_score.total_cmp(&a.reliability_score));
}

/// True when every cased character is upper-case and at least one exists
fn is_all_caps(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(source: &str, reliability: f64, title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            summary: String::new(),
            source: source.to_string(),
            published: None,
            manipulation_score: 0.0,
            reliability_score: reliability,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_plain_text_scores_zero() {
        let score = manipulation_score("fed leaves rates unchanged in quiet session");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_keyword_matches_accumulate() {
        // Two keyword hits over twelve checks
        let score = manipulation_score("Historic crash looms over equities");
        assert!((score - 2.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_caps_counts_once() {
        let score = manipulation_score("MARKETS IN TURMOIL");
        assert!((score - 1.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_excessive_punctuation_counts_once() {
        let score = manipulation_score("buy now!!! while it lasts");
        assert!((score - 1.0 / 12.0).abs() < 1e-9);

        // Two exclamation marks are not excessive
        let calm = manipulation_score("buy now!! while it lasts");
        assert_eq!(calm, 0.0);
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let text = "UNPRECEDENTED HISTORIC SHOCKING EMERGENCY CRISIS CRASH BUBBLE MOON ROCKET NEVER SEEN BEFORE!!!";
        let score = manipulation_score(text);
        assert!(score > 0.9);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_empty_text_scores_zero() {
        assert_eq!(manipulation_score(""), 0.0);
    }

    #[test]
    fn test_trusted_source_high_tier() {
        assert_eq!(source_reliability("https://www.federalreserve.gov/feeds/press_all.xml"), 0.9);
        assert_eq!(source_reliability("https://www.reuters.com/markets"), 0.9);
    }

    #[test]
    fn test_unknown_source_default_tier() {
        assert_eq!(source_reliability("https://example-blog.net/feed"), 0.6);
    }

    #[test]
    fn test_reliability_sort_is_stable_descending() {
        let mut items = vec![
            item("a", 0.6, "first-default"),
            item("b", 0.9, "first-trusted"),
            item("c", 0.6, "second-default"),
            item("d", 0.9, "second-trusted"),
        ];

        sort_by_reliability(&mut items);

        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["first-trusted", "second-trusted", "first-default", "second-default"]
        );
    }
}
