//! Session-token exchange with the payment provider.
//!
//! The provider issues a short-lived session token authorizing one
//! browser-based payment flow for one address/network/asset combination.
//! The exchange is a single authenticated POST: no retries, no timeout
//! beyond the transport default. Pluggable via [`TokenProvider`] so the
//! orchestrator can be exercised without a network.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use url::Url;

use crate::error::ProviderError;
use crate::request::{Asset, Network};

/// Default provider API base URL.
pub const ONRAMP_API_BASE_URL: &str = "https://api.developer.coinbase.com";

/// Path of the session-token endpoint.
pub(crate) const TOKEN_PATH: &str = "/onramp/v1/token";

#[derive(Serialize)]
struct TokenRequest<'a> {
    addresses: [AddressEntry<'a>; 1],
    assets: Vec<&'static str>,
}

#[derive(Serialize)]
struct AddressEntry<'a> {
    address: &'a str,
    blockchains: [&'static str; 1],
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Pluggable backend for the session-token exchange.
///
/// The real implementation is [`OnrampApi`]; tests substitute mocks to
/// drive the orchestrator through provider failures deterministically.
#[async_trait]
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// `(host, path)` of the token endpoint — the request descriptor a
    /// bearer credential must authorize.
    fn token_endpoint(&self) -> (String, String);

    /// Exchange a bearer credential for a session token.
    async fn request_token(
        &self,
        credential: &str,
        wallet_address: &str,
        network: Network,
        assets: &[Asset],
    ) -> Result<String, ProviderError>;
}

/// A boxed token provider for dynamic dispatch.
pub type BoxedTokenProvider = Box<dyn TokenProvider>;

/// Reqwest-backed client for the provider's onramp API.
#[derive(Debug, Clone)]
pub struct OnrampApi {
    client: reqwest::Client,
    base_url: Url,
}

impl Default for OnrampApi {
    fn default() -> Self {
        Self::new()
    }
}

impl OnrampApi {
    /// Create a client for the default provider API base URL.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(ONRAMP_API_BASE_URL).expect("static URL parses"),
        }
    }

    /// Point the client at a different API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Provide a custom [`reqwest::Client`] (e.g. with proxy or timeout).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl TokenProvider for OnrampApi {
    fn token_endpoint(&self) -> (String, String) {
        let host = match (self.base_url.host_str(), self.base_url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        (host, TOKEN_PATH.to_string())
    }

    async fn request_token(
        &self,
        credential: &str,
        wallet_address: &str,
        network: Network,
        assets: &[Asset],
    ) -> Result<String, ProviderError> {
        let url = self
            .base_url
            .join(TOKEN_PATH)
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid base URL: {e}")))?;
        let body = TokenRequest {
            addresses: [AddressEntry {
                address: wallet_address,
                blockchains: [network.as_str()],
            }],
            assets: assets.iter().map(|a| a.as_str()).collect(),
        };

        debug!(%url, wallet = wallet_address, network = network.as_str(), "requesting session token");

        let response = self
            .client
            .post(url)
            .bearer_auth(credential)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let token = parse_token_response(status, &text)?;

        // Session tokens are single-use credentials; log length only.
        debug!(token_len = token.len(), "session token obtained");
        Ok(token)
    }
}

/// Classify a provider response into a token or a [`ProviderError`].
///
/// HTTP-level failures keep the body verbatim; a success status with an
/// unparseable body or a missing/empty token field are distinct causes.
fn parse_token_response(status: StatusCode, body: &str) -> Result<String, ProviderError> {
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    match parsed.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ProviderError::MissingToken),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_provider_schema() {
        let body = TokenRequest {
            addresses: [AddressEntry {
                address: "0xabc",
                blockchains: [Network::Base.as_str()],
            }],
            assets: vec![Asset::Usdc.as_str()],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "addresses": [{"address": "0xabc", "blockchains": ["base"]}],
                "assets": ["USDC"],
            })
        );
    }

    #[test]
    fn success_response_yields_token() {
        let token = parse_token_response(StatusCode::OK, r#"{"token":"abc123"}"#).unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn error_status_carries_body_verbatim() {
        let err =
            parse_token_response(StatusCode::BAD_REQUEST, r#"{"message":"bad address"}"#)
                .unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, r#"{"message":"bad address"}"#);
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_success_body_is_malformed() {
        let err = parse_token_response(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn missing_or_empty_token_is_distinct_from_http_failure() {
        assert!(matches!(
            parse_token_response(StatusCode::OK, "{}").unwrap_err(),
            ProviderError::MissingToken
        ));
        assert!(matches!(
            parse_token_response(StatusCode::OK, r#"{"token":""}"#).unwrap_err(),
            ProviderError::MissingToken
        ));
    }

    #[test]
    fn token_endpoint_reflects_base_url() {
        let api = OnrampApi::new();
        let (host, path) = api.token_endpoint();
        assert_eq!(host, "api.developer.coinbase.com");
        assert_eq!(path, "/onramp/v1/token");

        let api = OnrampApi::new()
            .with_base_url(Url::parse("http://127.0.0.1:8912").unwrap());
        let (host, _) = api.token_endpoint();
        assert_eq!(host, "127.0.0.1:8912");
    }
}
