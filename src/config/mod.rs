use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::dashboard::AccountPreset;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub advisor: AdvisorApiConfig,
    pub http: HttpConfig,
    pub account_preset: AccountPreset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub username: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorApiConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Independent per-source timeout for quote and feed fetches
    pub timeout_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file - this sets env vars that aren't already set
        dotenv::dotenv().ok();

        let config = Config {
            gateway: GatewayConfig {
                username: env::var("GATEWAY_USERNAME").unwrap_or_else(|_| "demo".to_string()),
                api_key: env::var("GATEWAY_API_KEY").ok(),
                base_url: env::var("GATEWAY_BASE_URL")
                    .unwrap_or_else(|_| "https://api.topstepx.com".to_string()),
            },
            advisor: AdvisorApiConfig {
                api_key: env::var("OPENAI_API_KEY").ok(),
                api_url: env::var("ADVISOR_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
                model: env::var("ADVISOR_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
                timeout_seconds: env::var("ADVISOR_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid ADVISOR_TIMEOUT_SECONDS value")?,
            },
            http: HttpConfig {
                timeout_seconds: env::var("HTTP_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid HTTP_TIMEOUT_SECONDS value")?,
            },
            account_preset: env::var("ACCOUNT_PRESET")
                .unwrap_or_else(|_| "50K".to_string())
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid ACCOUNT_PRESET value: {}", e))?,
        };

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                username: "demo".to_string(),
                api_key: None,
                base_url: "https://api.topstepx.com".to_string(),
            },
            advisor: AdvisorApiConfig {
                api_key: None,
                api_url: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-4".to_string(),
                timeout_seconds: 30,
            },
            http: HttpConfig { timeout_seconds: 30 },
            account_preset: AccountPreset::Combine50k,
        }
    }
}
