//! Brokerage gateway client
//!
//! One configured endpoint and payload shape per the gateway's documented
//! key-login contract. The analysis core never depends on this client
//! being available; it only supplies account and position snapshots on
//! request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GatewayConfig;
use crate::data::{DataError, DataResult};

/// Documented key-login payload: `{"userName": ..., "apiKey": ...}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginKeyRequest<'a> {
    user_name: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginKeyResponse {
    token: Option<String>,
    success: bool,
    error_message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountSearchRequest {
    only_active_accounts: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountSearchResponse {
    #[serde(default)]
    accounts: Vec<GatewayAccount>,
    success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PositionSearchRequest {
    account_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionSearchResponse {
    #[serde(default)]
    positions: Vec<GatewayPosition>,
    success: bool,
}

/// Funded-account state as reported by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayAccount {
    pub id: i64,
    pub name: String,
    pub balance: f64,
    #[serde(default)]
    pub can_trade: bool,
}

/// An open position as reported by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPosition {
    pub contract_id: String,
    pub size: i64,
    pub average_price: f64,
    /// 1 = long, 2 = short in the gateway's convention
    #[serde(rename = "type")]
    pub position_type: i32,
    pub creation_timestamp: Option<DateTime<Utc>>,
}

/// Accounts plus the open positions of the first tradable account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySnapshot {
    pub accounts: Vec<GatewayAccount>,
    pub positions: Vec<GatewayPosition>,
    pub timestamp: DateTime<Utc>,
}

pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    api_key: String,
    token: Option<String>,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig, timeout_seconds: u64) -> DataResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| DataError::Config("GATEWAY_API_KEY is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .user_agent("tapewatch/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            api_key,
            token: None,
        })
    }

    /// Authenticate against the documented key-login endpoint
    pub async fn authenticate(&mut self) -> DataResult<()> {
        let url = format!("{}/api/Auth/loginKey", self.base_url);

        let payload = LoginKeyRequest {
            user_name: &self.username,
            api_key: &self.api_key,
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Authentication(format!(
                "Gateway login rejected with status {}",
                response.status().as_u16()
            )));
        }

        let body: LoginKeyResponse = response.json().await?;

        if !body.success {
            return Err(DataError::Authentication(
                body.error_message
                    .unwrap_or_else(|| "Gateway reported login failure".to_string()),
            ));
        }

        let token = body.token.ok_or_else(|| {
            DataError::Authentication("Gateway login succeeded without a token".to_string())
        })?;

        info!("Gateway authentication successful for {}", self.username);
        self.token = Some(token);
        Ok(())
    }

    /// Fetch active accounts; requires a prior `authenticate`
    pub async fn fetch_accounts(&self) -> DataResult<Vec<GatewayAccount>> {
        let url = format!("{}/api/Account/search", self.base_url);
        let request = AccountSearchRequest {
            only_active_accounts: true,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::api_error(
                response.status().as_u16(),
                "Gateway account search failed".to_string(),
            ));
        }

        let body: AccountSearchResponse = response.json().await?;

        if !body.success {
            return Err(DataError::no_data("gateway accounts"));
        }

        Ok(body.accounts)
    }

    /// Fetch open positions for one account
    pub async fn fetch_open_positions(&self, account_id: i64) -> DataResult<Vec<GatewayPosition>> {
        let url = format!("{}/api/Position/searchOpen", self.base_url);
        let request = PositionSearchRequest { account_id };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::api_error(
                response.status().as_u16(),
                format!("Gateway position search failed for account {}", account_id),
            ));
        }

        let body: PositionSearchResponse = response.json().await?;

        if !body.success {
            return Err(DataError::no_data(format!("positions for account {}", account_id)));
        }

        Ok(body.positions)
    }

    /// Authenticate if needed, then snapshot accounts and the first
    /// tradable account's open positions
    pub async fn snapshot(&mut self) -> DataResult<GatewaySnapshot> {
        if self.token.is_none() {
            self.authenticate().await?;
        }

        let accounts = self.fetch_accounts().await?;

        let positions = match accounts.iter().find(|a| a.can_trade).or(accounts.first()) {
            Some(account) => self.fetch_open_positions(account.id).await?,
            None => Vec::new(),
        };

        Ok(GatewaySnapshot {
            accounts,
            positions,
            timestamp: Utc::now(),
        })
    }

    fn bearer(&self) -> DataResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| DataError::Authentication("Not authenticated with gateway".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_payload_uses_documented_field_names() {
        let payload = LoginKeyRequest {
            user_name: "trader",
            api_key: "key-123",
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userName"], "trader");
        assert_eq!(json["apiKey"], "key-123");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_login_response_failure_shape() {
        let body: LoginKeyResponse = serde_json::from_str(
            r#"{"token": null, "success": false, "errorCode": 3, "errorMessage": "Invalid credentials"}"#,
        )
        .unwrap();

        assert!(!body.success);
        assert_eq!(body.error_message.as_deref(), Some("Invalid credentials"));
        assert!(body.token.is_none());
    }

    #[test]
    fn test_position_wire_shape() {
        let position: GatewayPosition = serde_json::from_str(
            r#"{"contractId": "CON.F.US.EP.U26", "size": 2, "averagePrice": 5310.25, "type": 1, "creationTimestamp": "2026-08-04T13:30:00Z"}"#,
        )
        .unwrap();

        assert_eq!(position.contract_id, "CON.F.US.EP.U26");
        assert_eq!(position.position_type, 1);
        assert_eq!(position.size, 2);
    }
}
