//! Fail-soft client for the dashboard ledger backend.
//!
//! The bot appends activity events and trade records so the dashboard can
//! display them. Logging must never interfere with trading: when the backend
//! is not configured every call is a no-op, and errors are logged and
//! swallowed.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

/// Fixed vocabulary of activity-log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityEventType {
    Scan,
    Opportunity,
    Executing,
    TradeComplete,
    Error,
    Heartbeat,
}

impl ActivityEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityEventType::Scan => "scan",
            ActivityEventType::Opportunity => "opportunity",
            ActivityEventType::Executing => "executing",
            ActivityEventType::TradeComplete => "trade_complete",
            ActivityEventType::Error => "error",
            ActivityEventType::Heartbeat => "heartbeat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Success,
    Failed,
    Pending,
}

/// One row in the trades table. Amounts are exact base-unit strings, the
/// same representation the quote API uses.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub tx_signature: Option<String>,
    pub input_mint: String,
    pub output_mint: String,
    pub input_amount: String,
    pub output_amount: String,
    pub profit_lamports: Option<i64>,
    pub profit_bps: Option<i64>,
    pub strategy: String,
    pub status: TradeStatus,
    pub error_message: Option<String>,
    pub executed_at: DateTime<Utc>,
}

struct Endpoint {
    url: String,
    service_key: String,
}

pub struct LedgerClient {
    http_client: Client,
    endpoint: Option<Endpoint>,
}

impl LedgerClient {
    /// Enabled only when both the URL and the service key are present.
    pub fn new(url: Option<String>, service_key: Option<String>) -> Self {
        let endpoint = match (url, service_key) {
            (Some(url), Some(service_key)) => Some(Endpoint { url, service_key }),
            _ => None,
        };
        Self {
            http_client: Client::new(),
            endpoint,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Append one activity event.
    pub async fn log_activity(
        &self,
        event_type: ActivityEventType,
        message: &str,
        data: Option<Value>,
        tx_signature: Option<&str>,
    ) {
        let body = json!({
            "event_type": event_type.as_str(),
            "message": message,
            "data": data,
            "tx_signature": tx_signature,
        });
        self.insert("activity_log", body).await;
    }

    /// Append one trade record.
    pub async fn log_trade(&self, record: &TradeRecord) {
        match serde_json::to_value(record) {
            Ok(body) => self.insert("trades", body).await,
            Err(err) => warn!("trade record serialization failed: {err}"),
        }
    }

    async fn insert(&self, table: &str, body: Value) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };
        let url = format!("{}/rest/v1/{}", endpoint.url, table);
        let result = self
            .http_client
            .post(&url)
            .header("apikey", &endpoint.service_key)
            .bearer_auth(&endpoint.service_key)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!("ledger insert into {table} returned {}", response.status());
            }
            Ok(_) => {}
            Err(err) => warn!("ledger insert into {table} failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types_serialize_to_backend_names() {
        for (event, expected) in [
            (ActivityEventType::Scan, "scan"),
            (ActivityEventType::Opportunity, "opportunity"),
            (ActivityEventType::Executing, "executing"),
            (ActivityEventType::TradeComplete, "trade_complete"),
            (ActivityEventType::Error, "error"),
            (ActivityEventType::Heartbeat, "heartbeat"),
        ] {
            assert_eq!(event.as_str(), expected);
            assert_eq!(
                serde_json::to_value(event).unwrap(),
                serde_json::Value::String(expected.to_string())
            );
        }
    }

    #[test]
    fn test_client_disabled_without_full_credentials() {
        assert!(!LedgerClient::disabled().is_enabled());
        assert!(!LedgerClient::new(Some("https://x".into()), None).is_enabled());
        assert!(!LedgerClient::new(None, Some("key".into())).is_enabled());
        assert!(LedgerClient::new(Some("https://x".into()), Some("key".into())).is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_client_is_a_noop() {
        // Must return without attempting any request.
        LedgerClient::disabled()
            .log_activity(ActivityEventType::Heartbeat, "idle", None, None)
            .await;
    }
}
