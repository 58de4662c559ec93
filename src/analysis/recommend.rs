//! Terminal advisory verdict: combines the market summary with
//! manipulation alerts through a fixed decision table

use serde::{Deserialize, Serialize};

use super::summary::MarketSummary;
use crate::data::NewsItem;

/// Items scoring at or below this are not alerted at all
const ALERT_THRESHOLD: f64 = 0.3;
/// Items scoring above this are HIGH severity
const HIGH_SEVERITY_THRESHOLD: f64 = 0.6;
/// Average strength above this counts as a strong market move
const ACTIVE_STRENGTH_THRESHOLD: f64 = 1.0;

const ALERT_ADVISORY: &str = "Exercise caution - potential market manipulation detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
}

/// Raised for news items whose manipulation score exceeds the alert threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManipulationAlert {
    pub severity: Severity,
    pub title: String,
    pub manipulation_score: f64,
    pub reliability_score: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Caution,
    Active,
    Monitor,
    Hold,
}

/// The single terminal output of the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub reason: String,
    /// Unset when there is no market data to be confident about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Derive alerts from a scored news batch
///
/// Scores in (0.3, 0.6] are MEDIUM, above 0.6 HIGH; at or below 0.3
/// nothing is raised.
pub fn derive_alerts(news: &[NewsItem]) -> Vec<ManipulationAlert> {
    let mut alerts = Vec::new();

    for item in news {
        if item.manipulation_score > ALERT_THRESHOLD {
            let severity = if item.manipulation_score > HIGH_SEVERITY_THRESHOLD {
                Severity::High
            } else {
                Severity::Medium
            };

            alerts.push(ManipulationAlert {
                severity,
                title: item.title.clone(),
                manipulation_score: item.manipulation_score,
                reliability_score: item.reliability_score,
                recommendation: ALERT_ADVISORY.to_string(),
            });
        }
    }

    alerts
}

/// Resolve the cycle's advisory verdict; first matching rule wins
///
/// A HIGH alert forces CAUTION even when average strength clears the
/// ACTIVE threshold. Deterministic given the same summary and alerts.
pub fn recommend(summary: &MarketSummary, alerts: &[ManipulationAlert]) -> Recommendation {
    let avg_strength = match summary.market_strength() {
        Some(strength) => strength,
        None => {
            return Recommendation {
                action: Action::Hold,
                reason: "Insufficient market data".to_string(),
                confidence: None,
            };
        }
    };

    let high_alerts = alerts
        .iter()
        .filter(|a| a.severity == Severity::High)
        .count();

    if high_alerts > 0 {
        Recommendation {
            action: Action::Caution,
            reason: format!("{} high-risk manipulation alerts detected", high_alerts),
            confidence: Some(0.3),
        }
    } else if avg_strength > ACTIVE_STRENGTH_THRESHOLD {
        Recommendation {
            action: Action::Active,
            reason: format!("Strong market movement detected (avg: {:.1}%)", avg_strength),
            confidence: Some(0.8),
        }
    } else {
        Recommendation {
            action: Action::Monitor,
            reason: "Low volatility environment".to_string(),
            confidence: Some(0.6),
        }
    }
}
