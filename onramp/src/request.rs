//! Funding request parameters and local validation.
//!
//! Validation runs before any cryptographic or network work: a request
//! that fails here never produces a credential or touches the provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Minimum fundable amount in USD (inclusive).
pub const MIN_AMOUNT_USD: f64 = 1.0;
/// Maximum fundable amount in USD per transaction (inclusive).
pub const MAX_AMOUNT_USD: f64 = 10_000.0;

/// Length of a 0x-prefixed EVM address string.
const ADDRESS_LEN: usize = 42;

/// Crypto asset to purchase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// USD Coin. The default.
    #[default]
    Usdc,
    /// Ether.
    Eth,
    /// Tether USD.
    Usdt,
}

impl Asset {
    /// The asset symbol as the provider expects it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usdc => "USDC",
            Self::Eth => "ETH",
            Self::Usdt => "USDT",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "USDC" => Ok(Self::Usdc),
            "ETH" => Ok(Self::Eth),
            "USDT" => Ok(Self::Usdt),
            other => Err(Error::validation(format!(
                "unsupported asset '{other}' (expected one of: USDC, ETH, USDT)"
            ))),
        }
    }
}

/// Blockchain network to deliver the asset on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Base. The default.
    #[default]
    Base,
    /// Ethereum mainnet.
    Ethereum,
    /// Polygon.
    Polygon,
}

impl Network {
    /// The network identifier as the provider expects it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Ethereum => "ethereum",
            Self::Polygon => "polygon",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "ethereum" => Ok(Self::Ethereum),
            "polygon" => Ok(Self::Polygon),
            other => Err(Error::validation(format!(
                "unsupported network '{other}' (expected one of: base, ethereum, polygon)"
            ))),
        }
    }
}

/// A single request to fund a wallet with fiat-purchased crypto.
///
/// Immutable once constructed. Asset and network default to USDC on Base
/// when not set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRequest {
    /// Destination wallet address (0x-prefixed).
    pub wallet_address: String,
    /// Amount to purchase, in USD.
    pub amount_usd: f64,
    /// Asset to purchase.
    #[serde(default)]
    pub asset: Asset,
    /// Network to deliver on.
    #[serde(default)]
    pub network: Network,
}

impl FundingRequest {
    /// Create a request for the default asset and network (USDC on Base).
    pub fn new(wallet_address: impl Into<String>, amount_usd: f64) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            amount_usd,
            asset: Asset::default(),
            network: Network::default(),
        }
    }

    /// Set the asset to purchase.
    #[must_use]
    pub const fn with_asset(mut self, asset: Asset) -> Self {
        self.asset = asset;
        self
    }

    /// Set the delivery network.
    #[must_use]
    pub const fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Validate the amount and wallet address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the amount is outside
    /// [`MIN_AMOUNT_USD`]..=[`MAX_AMOUNT_USD`] or the address is not a
    /// 0x-prefixed 42-character string.
    pub fn validate(&self) -> Result<()> {
        if !self.amount_usd.is_finite() || self.amount_usd < MIN_AMOUNT_USD {
            return Err(Error::validation(format!(
                "amount must be at least ${MIN_AMOUNT_USD}"
            )));
        }
        if self.amount_usd > MAX_AMOUNT_USD {
            return Err(Error::validation(format!(
                "amount cannot exceed ${MAX_AMOUNT_USD} per transaction"
            )));
        }

        if self.wallet_address.is_empty() || !self.wallet_address.starts_with("0x") {
            return Err(Error::validation(
                "wallet address must be a 0x-prefixed hex address",
            ));
        }
        if self.wallet_address.len() != ADDRESS_LEN {
            return Err(Error::validation(format!(
                "wallet address must be {ADDRESS_LEN} characters, got {}",
                self.wallet_address.len()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ADDR: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn accepts_valid_request() {
        let request = FundingRequest::new(ADDR, 25.0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn accepts_amount_bounds_inclusive() {
        assert!(FundingRequest::new(ADDR, 1.0).validate().is_ok());
        assert!(FundingRequest::new(ADDR, 10_000.0).validate().is_ok());
    }

    #[test]
    fn rejects_amount_below_minimum() {
        let err = FundingRequest::new(ADDR, 0.5).validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_amount_above_maximum() {
        let err = FundingRequest::new(ADDR, 10_000.01).validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_non_finite_amount() {
        assert!(FundingRequest::new(ADDR, f64::NAN).validate().is_err());
        assert!(FundingRequest::new(ADDR, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn rejects_missing_prefix() {
        let address = format!("ab{}", &ADDR[2..]);
        let err = FundingRequest::new(address, 25.0).validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_empty_address() {
        assert!(FundingRequest::new("", 25.0).validate().is_err());
    }

    #[test]
    fn rejects_wrong_length_address() {
        assert!(FundingRequest::new("0x1234", 25.0).validate().is_err());
    }

    #[test]
    fn parses_asset_and_network_case_insensitively() {
        assert_eq!("usdc".parse::<Asset>().unwrap(), Asset::Usdc);
        assert_eq!("ETH".parse::<Asset>().unwrap(), Asset::Eth);
        assert_eq!("Base".parse::<Network>().unwrap(), Network::Base);
        assert!("dogecoin".parse::<Asset>().is_err());
        assert!("solana".parse::<Network>().is_err());
    }

    #[test]
    fn serializes_wire_forms() {
        let request = FundingRequest::new(ADDR, 25.0)
            .with_asset(Asset::Usdt)
            .with_network(Network::Polygon);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["walletAddress"], ADDR);
        assert_eq!(value["asset"], "USDT");
        assert_eq!(value["network"], "polygon");
    }

    #[test]
    fn deserializes_with_defaults() {
        let request: FundingRequest =
            serde_json::from_str(&format!(r#"{{"walletAddress":"{ADDR}","amountUsd":50}}"#))
                .unwrap();
        assert_eq!(request.asset, Asset::Usdc);
        assert_eq!(request.network, Network::Base);
    }
}
