//! Unified error types for the onramp crate.
//!
//! Failures fall into two groups: those that abort a funding operation
//! (validation, rate limiting, signing, provider) and those that are
//! downgraded to a warning by the orchestrator (browser launch).

use thiserror::Error;

/// Result type alias for onramp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the onramp crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The funding request failed local validation. Reported before any
    /// signing or network work happens.
    #[error("invalid funding request: {0}")]
    Validation(String),

    /// The caller exceeded a local funding rate limit.
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Key material was unusable or signature generation failed. Fatal,
    /// never retried.
    #[error("credential signing failed: {0}")]
    Signing(String),

    /// The payment provider rejected the session-token exchange.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The payment URL could not be opened in a browser. The orchestrator
    /// downgrades this to a warning; it only surfaces as an error when the
    /// launcher is used directly.
    #[error("browser launch error: {0}")]
    Browser(#[from] BrowserError),
}

impl Error {
    /// Create a validation error with a message.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a signing error with a message.
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }
}

/// Errors from the session-token exchange with the payment provider.
///
/// HTTP-level rejections and malformed success bodies are distinct
/// variants so callers can branch without string matching.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Non-success HTTP status. The provider's response body is carried
    /// verbatim — it is the most useful diagnostic available.
    #[error("HTTP {status}: {body}")]
    Status {
        /// The HTTP status code returned by the provider.
        status: u16,
        /// The raw response body, unmodified.
        body: String,
    },

    /// The response had a success status but was not parseable JSON.
    #[error("invalid provider response: {0}")]
    MalformedResponse(String),

    /// The response parsed but contained no session token.
    #[error("provider response contained no session token")]
    MissingToken,

    /// The request never completed (connection, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors from attempting to open a URL in the operator's browser.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BrowserError {
    /// The platform has no known browser-open command. No command is
    /// attempted.
    #[error("no browser launch support for platform '{0}'")]
    UnsupportedPlatform(String),

    /// Every launch command for the platform failed. The URL is included
    /// so the caller can present it for manual use.
    #[error("could not open '{url}' in a browser: {detail}")]
    LaunchFailed {
        /// The URL that could not be opened.
        url: String,
        /// The failure from the last command attempted.
        detail: String,
    },
}
