use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::Credentials;

const PUSHOVER_MESSAGES_URL: &str = "https://api.pushover.net/1/messages.json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryResult {
    pub status: u16,
    pub body: serde_json::Value,
}

impl DeliveryResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<DeliveryResult, DeliveryError>;
}

pub struct PushoverNotifier {
    client: reqwest::Client,
    credentials: Credentials,
    endpoint: String,
}

impl PushoverNotifier {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoint(credentials, PUSHOVER_MESSAGES_URL)
    }

    pub fn with_endpoint(credentials: Credentials, endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            credentials,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, message: &str) -> Result<DeliveryResult, DeliveryError> {
        let form = [
            ("token", self.credentials.app_token.as_str()),
            ("user", self.credentials.user_key.as_str()),
            ("message", message),
        ];

        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(DeliveryResult {
            status,
            body: decode_body(&text),
        })
    }
}

/// Pushover answers JSON; anything else (proxy error pages) is kept verbatim.
fn decode_body(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_is_decoded() {
        let body = decode_body(r#"{"status":1,"request":"5042853c-402d-4a18-abcb-168734a801de"}"#);
        assert_eq!(body["status"], 1);
    }

    #[test]
    fn non_json_body_is_kept_as_text() {
        let body = decode_body("<html>502 Bad Gateway</html>");
        assert_eq!(body, serde_json::Value::String("<html>502 Bad Gateway</html>".to_string()));
    }

    #[test]
    fn success_covers_2xx_only() {
        let ok = DeliveryResult { status: 200, body: serde_json::Value::Null };
        let rejected = DeliveryResult { status: 400, body: serde_json::Value::Null };
        assert!(ok.is_success());
        assert!(!rejected.is_success());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_delivery_error() {
        let notifier = PushoverNotifier::with_endpoint(
            Credentials::new("token", "user"),
            "http://127.0.0.1:9/1/messages.json",
        );

        let result = notifier.notify("hello").await;

        assert!(matches!(result, Err(DeliveryError::Request(_))));
    }
}
