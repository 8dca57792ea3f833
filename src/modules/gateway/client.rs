use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use std::time::Duration;

use crate::api::error;
use crate::modules::gateway::model::{SendMedia, SendText};

/// Outbound side of the WhatsApp gateway.
#[async_trait::async_trait]
pub trait WhatsAppGateway {
    async fn send_text(&self, params: &SendText) -> Result<serde_json::Value, error::SystemError>;

    async fn send_media(&self, params: &SendMedia)
        -> Result<serde_json::Value, error::SystemError>;
}

/// UAZAPI HTTP client. Every call is a JSON POST authenticated by the `token` header.
#[derive(Clone)]
pub struct UazapiClient {
    client: reqwest::Client,
    base_url: String,
}

impl UazapiClient {
    pub fn new(
        base_url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, error::SystemError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "token",
            HeaderValue::from_str(token).map_err(|e| {
                error::SystemError::internal(format!("invalid gateway token header value: {e}"))
            })?,
        );
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).timeout(timeout).build()?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    async fn post<T: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<serde_json::Value, error::SystemError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "gateway request failed");
            error::SystemError::gateway(format!("gateway unreachable: {e}"))
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        tracing::debug!(%url, %status, "gateway response received");

        if !status.is_success() {
            return Err(error::SystemError::gateway(format!("UAZAPI error {status}: {text}")));
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            error::SystemError::gateway(format!("gateway returned an unreadable body: {e}"))
        })
    }
}

#[async_trait::async_trait]
impl WhatsAppGateway for UazapiClient {
    async fn send_text(&self, params: &SendText) -> Result<serde_json::Value, error::SystemError> {
        self.post("/send/text", params).await
    }

    async fn send_media(
        &self,
        params: &SendMedia,
    ) -> Result<serde_json::Value, error::SystemError> {
        self.post("/send/media", params).await
    }
}
