//! Funding orchestration.
//!
//! [`Onramp`] is the single entry point: it sequences validation,
//! credential signing, the session-token exchange, URL construction, and
//! the browser launch, and maps each failure into a typed error. Steps
//! run strictly in order; only the browser launch is allowed to fail
//! without failing the operation.

use std::time::SystemTime;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::audit::{SessionLog, SessionRecord};
use crate::browser::{BoxedUrlOpener, SystemOpener};
use crate::client::{BoxedTokenProvider, OnrampApi};
use crate::error::{Error, Result};
use crate::jwt::{SigningIdentity, issue_bearer_jwt};
use crate::limits::{RateLimiter, RateLimits};
use crate::pay_url::{ONRAMP_PAY_BASE_URL, payment_url};
use crate::request::FundingRequest;

/// The outcome of a successful funding orchestration.
///
/// Funding is not complete at this point — the operator still finishes
/// the purchase in the browser — so the result carries everything needed
/// to do that manually, including the URL and a locally generated
/// correlation id (not provider-issued, not security-sensitive).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingResult {
    /// Destination wallet address.
    pub wallet_address: String,
    /// Amount the payment session was created for.
    pub expected_amount: f64,
    /// Fiat currency of `expected_amount`.
    pub currency: String,
    /// Fully parameterized payment-session URL.
    pub onramp_url: String,
    /// Local correlation id for the operator's reference.
    pub session_id: String,
    /// Human-readable next step.
    pub message: String,
    /// Expected settlement window, as shown to the operator.
    pub estimated_arrival: String,
    /// Set when the browser could not be opened; funding proceeds
    /// manually via `onramp_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Builder for [`Onramp`].
///
/// Created by [`Onramp::builder`]. The signing identity is required;
/// everything else has production defaults.
#[derive(Debug, Default)]
pub struct OnrampBuilder {
    identity: Option<SigningIdentity>,
    provider: Option<BoxedTokenProvider>,
    opener: Option<BoxedUrlOpener>,
    pay_base: Option<Url>,
    limits: Option<RateLimits>,
}

impl OnrampBuilder {
    /// Set the signing identity used to authenticate with the provider.
    #[must_use]
    pub fn identity(mut self, identity: SigningIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Replace the session-token backend (defaults to [`OnrampApi`]).
    #[must_use]
    pub fn token_provider(mut self, provider: BoxedTokenProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the URL opener (defaults to [`SystemOpener`]).
    #[must_use]
    pub fn url_opener(mut self, opener: BoxedUrlOpener) -> Self {
        self.opener = Some(opener);
        self
    }

    /// Override the hosted payment page base URL.
    #[must_use]
    pub fn pay_base_url(mut self, base: Url) -> Self {
        self.pay_base = Some(base);
        self
    }

    /// Enable per-wallet rate limiting.
    #[must_use]
    pub const fn rate_limits(mut self, limits: RateLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Build the [`Onramp`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signing`] if no identity was configured.
    pub fn build(self) -> Result<Onramp> {
        let identity = self
            .identity
            .ok_or_else(|| Error::signing("a signing identity is required"))?;

        Ok(Onramp {
            identity,
            provider: self
                .provider
                .unwrap_or_else(|| Box::new(OnrampApi::new())),
            opener: self.opener.unwrap_or_else(|| Box::new(SystemOpener::new())),
            pay_base: self
                .pay_base
                .unwrap_or_else(|| Url::parse(ONRAMP_PAY_BASE_URL).expect("static URL parses")),
            limiter: self.limits.map(RateLimiter::new),
            sessions: SessionLog::new(),
        })
    }
}

/// Orchestrates a fiat-to-crypto funding flow for a wallet.
///
/// Holds the long-lived signing identity and the pluggable provider and
/// browser seams. Each [`fund`](Self::fund) call is an independent
/// operation that mints its own credential and nonce; the orchestrator
/// shares no mutable state between concurrent calls beyond the rate
/// limiter and session log, which synchronize internally.
#[derive(Debug)]
pub struct Onramp {
    identity: SigningIdentity,
    provider: BoxedTokenProvider,
    opener: BoxedUrlOpener,
    pay_base: Url,
    limiter: Option<RateLimiter>,
    sessions: SessionLog,
}

impl Onramp {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> OnrampBuilder {
        OnrampBuilder::default()
    }

    /// Initiate a funding flow for a wallet.
    ///
    /// Sequence: validate → rate-limit check → sign credential → exchange
    /// for a session token → build the payment URL → open the browser.
    /// A browser failure does not fail the operation; it is logged and
    /// recorded as a warning on the result. Nothing is retried.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`], [`Error::RateLimited`], [`Error::Signing`],
    /// or [`Error::Provider`], each aborting the operation at its step.
    pub async fn fund(&self, request: &FundingRequest) -> Result<FundingResult> {
        request.validate()?;
        if let Some(limiter) = &self.limiter {
            limiter.check(&request.wallet_address, request.amount_usd)?;
        }

        let (host, path) = self.provider.token_endpoint();
        let credential = issue_bearer_jwt(&self.identity, "POST", &host, &path)?;

        let token = self
            .provider
            .request_token(
                &credential,
                &request.wallet_address,
                request.network,
                &[request.asset],
            )
            .await?;

        let onramp_url = payment_url(
            &self.pay_base,
            &token,
            request.amount_usd,
            request.asset,
            request.network,
        );
        let session_id = Uuid::new_v4().to_string();

        let warning = match self.opener.open(&onramp_url).await {
            Ok(()) => None,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "browser launch failed; funding can proceed manually");
                Some(format!(
                    "Could not open a browser automatically ({e}). Open the onramp URL manually to continue."
                ))
            }
        };

        if let Some(limiter) = &self.limiter {
            limiter.record(&request.wallet_address, request.amount_usd);
        }
        self.sessions.record(SessionRecord {
            timestamp: SystemTime::now(),
            session_id: session_id.clone(),
            wallet_address: request.wallet_address.clone(),
            amount_usd: request.amount_usd,
            asset: request.asset,
            network: request.network,
        });

        info!(
            session_id = %session_id,
            wallet = %request.wallet_address,
            amount_usd = request.amount_usd,
            asset = request.asset.as_str(),
            network = request.network.as_str(),
            "funding session created"
        );

        Ok(FundingResult {
            wallet_address: request.wallet_address.clone(),
            expected_amount: request.amount_usd,
            currency: "USD".to_string(),
            onramp_url,
            session_id,
            message: format!(
                "Complete the {} purchase in your browser to fund {}.",
                request.asset, request.wallet_address
            ),
            estimated_arrival: "Funds typically arrive within a few minutes of payment."
                .to_string(),
            warning,
        })
    }

    /// The audit trail of sessions created by this orchestrator.
    #[must_use]
    pub const fn sessions(&self) -> &SessionLog {
        &self.sessions
    }
}
