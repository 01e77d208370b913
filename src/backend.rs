//! HTTP client for the contact API, used by the agent tools.
//!
//! Performs no validation of its own; correctness rests entirely on the
//! router + store contract. Non-2xx responses are returned as decoded
//! [`BackendResponse`]s so callers can surface the `detail` message;
//! transport failures propagate as errors.

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

/// Decoded response from the contact API.
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `detail` field of an error body, or a fallback.
    pub fn detail(&self) -> String {
        self.body
            .get("detail")
            .and_then(|d| d.as_str())
            .unwrap_or("Unknown error")
            .to_string()
    }
}

impl BackendClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn create_contact(&self, payload: &Value) -> Result<BackendResponse> {
        let resp = self
            .client
            .post(format!("{}/contacts", self.base_url))
            .json(payload)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_contacts(
        &self,
        search: Option<&str>,
        tag: Option<&str>,
    ) -> Result<BackendResponse> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(search) = search {
            params.push(("search", search));
        }
        if let Some(tag) = tag {
            params.push(("tag", tag));
        }

        let resp = self
            .client
            .get(format!("{}/contacts", self.base_url))
            .query(&params)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn update_contact(&self, id: &str, patch: &Value) -> Result<BackendResponse> {
        let resp = self
            .client
            .put(format!("{}/contacts/{}", self.base_url, id))
            .json(patch)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_contact(&self, id: &str) -> Result<BackendResponse> {
        let resp = self
            .client
            .delete(format!("{}/contacts/{}", self.base_url, id))
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode(resp: reqwest::Response) -> Result<BackendResponse> {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    Ok(BackendResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = BackendClient::new("http://127.0.0.1:8001/api/", 5).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:8001/api");
    }

    #[test]
    fn detail_falls_back_when_absent() {
        let resp = BackendResponse {
            status: StatusCode::BAD_REQUEST,
            body: json!({"detail": "A contact with this email already exists"}),
        };
        assert_eq!(resp.detail(), "A contact with this email already exists");

        let resp = BackendResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Value::Null,
        };
        assert_eq!(resp.detail(), "Unknown error");
    }
}
