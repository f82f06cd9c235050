//! Thin HTTP layer shared by the provider strategies.
//!
//! Owns the reqwest client, applies credentials, and folds every transport or
//! status failure into the shared error taxonomy so strategy code only ever
//! sees [`BridgeError`] values.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tb_config::{AuthType, HttpConfig, ProviderCredentials};
use tb_types::{BridgeError, BridgeResult};
use tracing::debug;

/// Authenticated JSON client bound to one backend's base URL.
pub struct ApiClient {
    base_url: String,
    credentials: ProviderCredentials,
    client: Client,
}

impl ApiClient {
    /// Build a client for `credentials` using the shared HTTP settings.
    ///
    /// # Errors
    ///
    /// Fails only when the underlying TLS/client initialization fails.
    pub fn new(credentials: ProviderCredentials, http: &HttpConfig) -> BridgeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .danger_accept_invalid_certs(http.accept_invalid_certs)
            .build()
            .map_err(|e| {
                BridgeError::ProviderInternal(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: credentials.url.trim_end_matches('/').to_string(),
            credentials,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> BridgeResult<Value> {
        let mut request = self.client.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute("GET", path, request).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> BridgeResult<Value> {
        self.execute("POST", path, self.client.post(self.url(path)).json(body))
            .await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> BridgeResult<Value> {
        self.execute("PUT", path, self.client.put(self.url(path)).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> BridgeResult<Value> {
        self.execute("DELETE", path, self.client.delete(self.url(path)))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.auth_type {
            AuthType::Basic => {
                request.basic_auth(&self.credentials.username, Some(&self.credentials.token))
            }
            AuthType::Bearer => request.bearer_auth(&self.credentials.token),
        }
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> BridgeResult<Value> {
        debug!(method, path, "backend request");

        let response = self
            .apply_auth(request)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(map_status_error(status, &detail));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        // Some backends answer DELETE with 200 and an empty body.
        let text = response.text().await.map_err(map_transport_error)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            BridgeError::ProviderInternal(format!("malformed response body: {}", e))
        })
    }
}

/// Errors raised outside a status line: connection refusals, DNS failures,
/// timeouts. Builder and body-decode failures are our side, so those map to
/// the internal class instead of network.
fn map_transport_error(error: reqwest::Error) -> BridgeError {
    if error.is_builder() || error.is_decode() {
        BridgeError::ProviderInternal(error.to_string())
    } else {
        BridgeError::ProviderNetwork(error.to_string())
    }
}

fn map_status_error(status: StatusCode, detail: &str) -> BridgeError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BridgeError::ProviderAuth(format!(
            "authentication rejected ({}): {}",
            status, detail
        )),
        StatusCode::NOT_FOUND => {
            BridgeError::ProviderNotFound(format!("resource not found: {}", detail))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            BridgeError::ProviderRateLimited(format!("rate limited by backend: {}", detail))
        }
        _ => BridgeError::ProviderInternal(format!("API error ({}): {}", status, detail)),
    }
}
