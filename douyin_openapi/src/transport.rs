use std::sync::Arc;

use dpg_common::Secret;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde_json::Value;

use crate::OpenApiError;

/// Sends a JSON body to the platform and hands back the raw response body.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Vec<u8>, OpenApiError>;
}

/// Supplies the bearer token for endpoints that need one. Caching and refreshing the token is the implementor's
/// concern.
#[allow(async_fn_in_trait)]
pub trait AccessTokenProvider {
    async fn access_token(&self) -> Result<Secret<String>, OpenApiError>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Arc<Client>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, OpenApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| OpenApiError::ConfigurationError(e.to_string()))?;
        Ok(Self { client: Arc::new(client) })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Vec<u8>, OpenApiError> {
        trace!("📡️ POST {url}");
        let response =
            self.client.post(url).json(body).send().await.map_err(|e| OpenApiError::TransportError(e.to_string()))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| OpenApiError::TransportError(e.to_string()))?;
        if !status.is_success() {
            let message = String::from_utf8_lossy(&bytes);
            warn!("📡️ {url} answered with HTTP {status}. {message}");
            return Err(OpenApiError::TransportError(format!("HTTP {status}: {message}")));
        }
        trace!("📡️ {url} answered with {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// A fixed token, for callers that manage token refresh elsewhere.
#[derive(Debug, Clone)]
pub struct StaticAccessToken {
    token: Secret<String>,
}

impl StaticAccessToken {
    pub fn new(token: Secret<String>) -> Self {
        Self { token }
    }
}

impl AccessTokenProvider for StaticAccessToken {
    async fn access_token(&self) -> Result<Secret<String>, OpenApiError> {
        if self.token.is_blank() {
            return Err(OpenApiError::AccessTokenError("No access token has been configured".into()));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn static_token() {
        let provider = StaticAccessToken::new(Secret::new("0801121846735352506a356a6557".into()));
        assert_eq!(provider.access_token().await.unwrap().reveal(), "0801121846735352506a356a6557");
        let empty = StaticAccessToken::new(Secret::default());
        assert!(matches!(empty.access_token().await, Err(OpenApiError::AccessTokenError(_))));
    }
}
