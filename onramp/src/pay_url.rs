//! Payment-session URL construction.
//!
//! Pure and deterministic: the same token and funding parameters always
//! produce a byte-identical URL. Inputs are validated upstream, so this
//! never fails.

use url::Url;

use crate::request::{Asset, Network};

/// Default hosted payment page the session URL is built on.
pub const ONRAMP_PAY_BASE_URL: &str = "https://pay.coinbase.com/buy/select-asset";

/// Compose the outbound payment URL from a session token and funding
/// parameters.
#[must_use]
pub fn payment_url(
    base: &Url,
    session_token: &str,
    amount_usd: f64,
    asset: Asset,
    network: Network,
) -> String {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("sessionToken", session_token)
        .append_pair("defaultAsset", asset.as_str())
        .append_pair("defaultNetwork", network.as_str())
        .append_pair("presetFiatAmount", &format_amount(amount_usd));
    url.into()
}

/// Stringify a USD amount with no currency symbol or separators.
/// Whole amounts render without a trailing `.0`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        // Amounts are bounded well inside i64 by upstream validation.
        format!("{}", amount as i64)
    } else {
        format!("{amount}")
    }
}
