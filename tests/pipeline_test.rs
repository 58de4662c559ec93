//! End-to-end scenarios for the analysis pipeline's pure stages

use chrono::Utc;
use std::collections::HashMap;

use tapewatch::analysis::pipeline::combine;
use tapewatch::analysis::{
    classify, manipulation_score, sort_by_reliability, source_reliability, summarize, Action,
    Sentiment, Severity,
};
use tapewatch::data::news::score_entry;
use tapewatch::data::{NewsItem, Quote, QuoteBatch};

fn batch_of(changes: &[(&str, f64)]) -> QuoteBatch {
    let mut quotes = HashMap::new();
    for (symbol, change_pct) in changes {
        quotes.insert(
            symbol.to_string(),
            Quote {
                symbol: symbol.to_string(),
                price: 100.0,
                change: *change_pct,
                change_percent: *change_pct,
                volume: 1000,
                high: 101.0,
                low: 99.0,
                timestamp: Utc::now(),
            },
        );
    }
    QuoteBatch {
        source: "test".to_string(),
        reliability_score: 0.85,
        quotes,
        timestamp: Utc::now(),
    }
}

fn harvested(title: &str, summary: &str, source: &str) -> NewsItem {
    score_entry(title.to_string(), summary.to_string(), source, None)
}

#[test]
fn classification_matches_thresholds_everywhere() {
    for p in [-3.0, -0.51, -0.5, -0.49, 0.0, 0.49, 0.5, 0.51, 3.0] {
        let expected = if p > 0.5 {
            Sentiment::Bullish
        } else if p < -0.5 {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        };
        assert_eq!(classify(p), expected, "change_percent {}", p);
    }
}

#[test]
fn half_bullish_cycle_stays_neutral() {
    // NQ and ES clear the 0.5% bar, CL and GC do not: ratio 0.5
    let batch = batch_of(&[("NQ", 0.8), ("ES", 0.6), ("CL", -0.2), ("GC", 0.3)]);
    let summary = summarize(&batch);
    assert_eq!(summary.overall_sentiment(), Some(Sentiment::Neutral));
}

#[test]
fn bullish_cycle_with_low_strength_monitors() {
    let batch = batch_of(&[("NQ", 0.9), ("ES", 0.7), ("CL", 0.6), ("GC", -0.1)]);
    let summary = summarize(&batch);

    // Ratio 0.75 -> BULLISH; average strength 0.575 stays under the
    // ACTIVE threshold
    assert_eq!(summary.overall_sentiment(), Some(Sentiment::Bullish));
    let strength = summary.market_strength().unwrap();
    assert!((strength - 0.575).abs() < 1e-9);

    let analysis = combine(batch, Vec::new());
    assert_eq!(analysis.recommendation.action, Action::Monitor);
    assert_eq!(analysis.recommendation.confidence, Some(0.6));
}

#[test]
fn high_alert_overrides_strong_market() {
    // Average strength 2.0 would be ACTIVE on its own
    let batch = batch_of(&[("NQ", 2.5), ("ES", 1.5)]);

    let hype = harvested(
        "UNPRECEDENTED HISTORIC EMERGENCY!!!",
        "Shocking crisis!!! Crash imminent, bubble popping, moon or bust!!!",
        "https://example-blog.net/feed",
    );
    assert!(hype.manipulation_score > 0.6);

    let analysis = combine(batch, vec![hype]);
    assert_eq!(analysis.recommendation.action, Action::Caution);
    assert_eq!(analysis.recommendation.confidence, Some(0.3));
    assert_eq!(analysis.manipulation_alerts.len(), 1);
    assert_eq!(analysis.manipulation_alerts[0].severity, Severity::High);
}

#[test]
fn empty_cycle_resolves_to_hold() {
    let analysis = combine(QuoteBatch::empty(), Vec::new());

    assert!(!analysis.market_summary.has_data());
    assert_eq!(analysis.recommendation.action, Action::Hold);
    assert_eq!(analysis.recommendation.reason, "Insufficient market data");
    assert_eq!(analysis.recommendation.confidence, None);
}

#[test]
fn scores_stay_in_bounds_for_arbitrary_text() {
    let samples = [
        "",
        "plain market wrap",
        "HISTORIC CRASH!!! UNPRECEDENTED EMERGENCY??? shocking crisis bubble moon rocket never seen before",
        "?????",
        "mixed Case With one keyword: crash",
    ];

    for text in samples {
        let score = manipulation_score(text);
        assert!((0.0..=1.0).contains(&score), "score {} for {:?}", score, text);
    }
}

#[test]
fn reliability_is_strictly_two_tier() {
    let sources = [
        ("https://www.federalreserve.gov/feeds/press_all.xml", 0.9),
        ("https://www.cmegroup.com/rss/all-press-releases.xml", 0.9),
        ("https://feeds.finance.yahoo.com/rss/2.0/headline", 0.6),
        ("https://random-newsletter.io/rss", 0.6),
    ];

    for (source, expected) in sources {
        assert_eq!(source_reliability(source), expected, "{}", source);
    }
}

#[test]
fn rescoring_and_resorting_is_deterministic() {
    let build = || {
        vec![
            harvested("Oil inventories fall", "", "https://feeds.finance.yahoo.com/rss/2.0/headline"),
            harvested("Rate statement released", "", "https://www.federalreserve.gov/feeds/press_all.xml"),
            harvested("Volume records set", "", "https://www.cmegroup.com/rss/all-press-releases.xml"),
            harvested("Crash warning!!!", "moon rocket", "https://example-blog.net/feed"),
        ]
    };

    let mut first = build();
    sort_by_reliability(&mut first);

    for _ in 0..5 {
        let mut again = build();
        sort_by_reliability(&mut again);

        let titles_a: Vec<&str> = first.iter().map(|i| i.title.as_str()).collect();
        let titles_b: Vec<&str> = again.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles_a, titles_b);
    }

    // Trusted sources lead; ties keep harvest order
    assert_eq!(first[0].title, "Rate statement released");
    assert_eq!(first[1].title, "Volume records set");
    assert_eq!(first[2].title, "Oil inventories fall");
    assert_eq!(first[3].title, "Crash warning!!!");
}

#[test]
fn recommendation_always_resolves_to_a_defined_action() {
    let cycles = [
        combine(QuoteBatch::empty(), Vec::new()),
        combine(batch_of(&[("ES", 0.1)]), Vec::new()),
        combine(batch_of(&[("ES", 5.0)]), Vec::new()),
        combine(
            batch_of(&[("ES", 5.0)]),
            vec![harvested(
                "CRASH EMERGENCY HISTORIC SHOCKING!!!",
                "unprecedented crisis, bubble to moon on rocket fuel, never seen before",
                "https://x.net",
            )],
        ),
    ];

    let actions: Vec<Action> = cycles.iter().map(|c| c.recommendation.action).collect();
    assert_eq!(
        actions,
        vec![Action::Hold, Action::Monitor, Action::Active, Action::Caution]
    );
}
