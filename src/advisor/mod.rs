//! Advisory chat-model wrapper
//!
//! Formats trading prompts over a finished analysis cycle and parses the
//! model's free text against an explicit schema. Malformed output yields a
//! structured default, never a crash, and every failure is classified as
//! schema-mismatch or unparseable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::analysis::MarketAnalysis;
use crate::config::Config;

const SYSTEM_PROMPT: &str = "You are a futures trading assistant covering E-mini index, \
crude oil and gold contracts for funded evaluation accounts. Respect daily loss limits \
and position size limits at all times. Respond to every request with a single JSON \
object and no surrounding prose.";

/// Advisory client configuration
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub api_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4".to_string(),
            timeout_seconds: 30,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Expected shape of a market-assessment reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAssessment {
    pub sentiment: String,
    pub recommendation: String,
    pub risk_level: String,
}

impl Default for MarketAssessment {
    fn default() -> Self {
        Self {
            sentiment: "Neutral".to_string(),
            recommendation: "Monitor market conditions before trading".to_string(),
            risk_level: "Medium".to_string(),
        }
    }
}

/// Expected shape of a per-symbol signal reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub signal: String,
    #[serde(default)]
    pub entry: Option<f64>,
    #[serde(default)]
    pub stop: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl TradeSignal {
    fn neutral() -> Self {
        Self {
            signal: "NEUTRAL".to_string(),
            entry: None,
            stop: None,
            target: None,
            confidence: None,
        }
    }
}

/// How a reply fared against the expected schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Valid,
    /// Valid JSON that does not match the expected shape
    SchemaMismatch,
    /// Not JSON at all
    Unparseable,
}

/// A typed reply plus how it was obtained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advised<T> {
    pub value: T,
    pub parse_status: ParseStatus,
    pub raw: String,
}

pub struct AdvisorClient {
    client: reqwest::Client,
    config: AdvisorConfig,
    api_key: String,
}

impl AdvisorClient {
    pub fn new(config: AdvisorConfig, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("tapewatch/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            config,
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .advisor
            .api_key
            .clone()
            .context("ADVISOR_API_KEY is required for advisory commands")?;

        Ok(Self::new(
            AdvisorConfig {
                api_url: config.advisor.api_url.clone(),
                model: config.advisor.model.clone(),
                timeout_seconds: config.advisor.timeout_seconds,
                max_attempts: 3,
            },
            api_key,
        ))
    }

    /// Ask the model for an overall assessment of a finished cycle
    pub async fn assess_market(&self, analysis: &MarketAnalysis) -> Result<Advised<MarketAssessment>> {
        let prompt = build_assessment_prompt(analysis)?;
        let raw = self.generate(&prompt).await?;

        let (value, parse_status) = parse_reply::<MarketAssessment>(&raw, MarketAssessment::default());
        Ok(Advised {
            value,
            parse_status,
            raw,
        })
    }

    /// Ask the model for an intraday signal on one symbol
    pub async fn signal_for(&self, symbol: &str, timeframe: &str) -> Result<Advised<TradeSignal>> {
        let prompt = build_signal_prompt(symbol, timeframe);
        let raw = self.generate(&prompt).await?;

        let (value, parse_status) = parse_reply::<TradeSignal>(&raw, TradeSignal::neutral());
        Ok(Advised {
            value,
            parse_status,
            raw,
        })
    }

    /// One chat completion with bounded attempts and a per-call timeout
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: 1500,
            temperature: 0.3,
        };

        let mut last_error = None;
        for attempt in 1..=self.config.max_attempts {
            let call = self
                .client
                .post(&self.config.api_url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send();

            match timeout(Duration::from_secs(self.config.timeout_seconds), call).await {
                Ok(Ok(response)) if response.status().is_success() => {
                    let body: ChatResponse = response.json().await?;
                    let content = body
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .context("Advisory reply carried no choices")?;

                    info!(
                        "Advisory reply received ({} chars, model '{}')",
                        content.len(),
                        self.config.model
                    );
                    return Ok(content);
                }
                Ok(Ok(response)) => {
                    let status = response.status().as_u16();
                    warn!("Advisory API returned status {} on attempt {}", status, attempt);
                    last_error = Some(anyhow::anyhow!("Advisory API returned status {}", status));
                }
                Ok(Err(e)) => {
                    warn!("Advisory API error on attempt {}: {}", attempt, e);
                    last_error = Some(anyhow::anyhow!("Advisory API error: {}", e));
                }
                Err(_) => {
                    warn!(
                        "Advisory call timed out after {}s on attempt {}",
                        self.config.timeout_seconds, attempt
                    );
                    last_error = Some(anyhow::anyhow!(
                        "Advisory call timed out after {}s",
                        self.config.timeout_seconds
                    ));
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Advisory call failed")))
    }
}

/// Classify a reply against schema `T`, falling back to `default`
///
/// Invalid JSON is Unparseable; valid JSON of the wrong shape is
/// SchemaMismatch. Both return the structured default.
pub fn parse_reply<T: serde::de::DeserializeOwned>(raw: &str, default: T) -> (T, ParseStatus) {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return (default, ParseStatus::Unparseable),
    };

    match serde_json::from_value::<T>(value) {
        Ok(parsed) => (parsed, ParseStatus::Valid),
        Err(_) => (default, ParseStatus::SchemaMismatch),
    }
}

fn build_assessment_prompt(analysis: &MarketAnalysis) -> Result<String> {
    let summary = serde_json::to_string_pretty(&analysis.market_summary)?;
    let alerts = serde_json::to_string_pretty(&analysis.manipulation_alerts)?;
    let recommendation = serde_json::to_string_pretty(&analysis.recommendation)?;

    Ok(format!(
        "Current market analysis cycle:\n\n\
         Market summary:\n{summary}\n\n\
         Manipulation alerts:\n{alerts}\n\n\
         Pipeline recommendation:\n{recommendation}\n\n\
         Reply with JSON: {{\"sentiment\": \"Bullish|Bearish|Neutral\", \
         \"recommendation\": \"...\", \"risk_level\": \"Low|Medium|High\"}}"
    ))
}

fn build_signal_prompt(symbol: &str, timeframe: &str) -> String {
    format!(
        "Generate an intraday signal for {symbol} on the {timeframe} timeframe. \
         Consider daily loss limits and typical intraday ranges. \
         Reply with JSON: {{\"signal\": \"LONG|SHORT|NEUTRAL\", \"entry\": number, \
         \"stop\": number, \"target\": number, \"confidence\": number between 0 and 1}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_reply_parses_to_schema() {
        let raw = r#"{"sentiment": "Bullish", "recommendation": "Scale in on pullbacks", "risk_level": "Low"}"#;
        let (value, status) = parse_reply::<MarketAssessment>(raw, MarketAssessment::default());

        assert_eq!(status, ParseStatus::Valid);
        assert_eq!(value.sentiment, "Bullish");
    }

    #[test]
    fn test_wrong_shape_is_schema_mismatch_with_default() {
        let raw = r#"{"mood": "great", "vibes": 11}"#;
        let (value, status) = parse_reply::<MarketAssessment>(raw, MarketAssessment::default());

        assert_eq!(status, ParseStatus::SchemaMismatch);
        assert_eq!(value.sentiment, "Neutral");
        assert_eq!(value.risk_level, "Medium");
    }

    #[test]
    fn test_prose_is_unparseable_with_default() {
        let raw = "The market looks choppy today; I would stay flat.";
        let (value, status) = parse_reply::<TradeSignal>(raw, TradeSignal::neutral());

        assert_eq!(status, ParseStatus::Unparseable);
        assert_eq!(value.signal, "NEUTRAL");
        assert_eq!(value.confidence, None);
    }

    #[test]
    fn test_signal_prompt_names_the_symbol() {
        let prompt = build_signal_prompt("NQ", "5m");
        assert!(prompt.contains("NQ"));
        assert!(prompt.contains("5m"));
    }
}
