//! Fiat-to-crypto wallet funding for AI agents via a hosted payment onramp.
//!
//! An agent supplies a wallet address, a USD amount, an asset, and a
//! network; the crate mints a short-lived signed credential, exchanges it
//! with the payment provider for a one-shot session token, composes the
//! payment URL, and makes a best-effort attempt to open it in the
//! operator's browser. The agent never touches payment credentials.
//!
//! # Architecture
//!
//! ```text
//! Onramp (orchestrator)
//!   ├── FundingRequest::validate()        — bounds and address shape
//!   ├── RateLimiter (optional)            — per-wallet sliding windows
//!   ├── issue_bearer_jwt()                — ES256, 120s, fresh nonce
//!   ├── dyn TokenProvider                 — session-token exchange
//!   │     └── OnrampApi (reqwest)
//!   ├── payment_url()                     — deterministic URL
//!   ├── dyn UrlOpener                     — platform launch fallbacks
//!   │     └── SystemOpener
//!   └── SessionLog                        — bounded audit trail
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use onramp::{FundingRequest, Onramp, SigningIdentity};
//!
//! let identity = SigningIdentity::from_pem(key_id, &pem)?;
//! let onramp = Onramp::builder().identity(identity).build()?;
//!
//! let result = onramp
//!     .fund(&FundingRequest::new("0xf39F...2266", 25.0))
//!     .await?;
//! println!("complete the purchase at {}", result.onramp_url);
//! ```
//!
//! Validation, signing, and provider failures abort the operation with a
//! typed [`Error`]; a failed browser launch does not — the result is
//! still returned with the URL and a warning so funding can proceed
//! manually.

pub mod audit;
pub mod browser;
pub mod client;
pub mod error;
pub mod flow;
pub mod jwt;
pub mod limits;
pub mod pay_url;
pub mod request;

pub use browser::{Platform, SystemOpener, UrlOpener};
pub use client::{ONRAMP_API_BASE_URL, OnrampApi, TokenProvider};
pub use error::{BrowserError, Error, ProviderError, Result};
pub use flow::{FundingResult, Onramp, OnrampBuilder};
pub use jwt::SigningIdentity;
pub use limits::RateLimits;
pub use pay_url::ONRAMP_PAY_BASE_URL;
pub use request::{Asset, FundingRequest, Network};
