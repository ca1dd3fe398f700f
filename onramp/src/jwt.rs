//! ES256 bearer-credential issuance.
//!
//! Each funding attempt mints a fresh, single-use JWT that authorizes
//! exactly one HTTP call to the payment provider. The credential is
//! signed with the operator's long-lived P-256 key and is valid for a
//! deliberately short window: it authorizes one immediate API call, not
//! a session.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use p256::SecretKey;
use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::DecodePrivateKey as _;
use rand::RngCore as _;
use rand::rngs::OsRng;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Credential lifetime in seconds. Issued-at and not-before are "now";
/// expiry is always exactly this far ahead.
pub const CREDENTIAL_TTL_SECS: u64 = 120;

/// Fixed issuer claim expected by the provider.
const CLAIM_ISSUER: &str = "cdp";

/// Bytes of CSPRNG output in the per-credential replay nonce.
const NONCE_BYTES: usize = 16;

/// The signing identity used to authenticate with the payment provider.
///
/// Holds a key identifier and the corresponding P-256 private key.
/// Long-lived and read-only: one identity is resolved from configuration
/// per process and shared across funding operations. The key material is
/// never logged; `Debug` redacts it.
pub struct SigningIdentity {
    key_id: String,
    secret: SecretKey,
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("key_id", &self.key_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl SigningIdentity {
    /// Create an identity from a key identifier and a P-256 private key.
    #[must_use]
    pub fn new(key_id: impl Into<String>, secret: SecretKey) -> Self {
        Self {
            key_id: key_id.into(),
            secret,
        }
    }

    /// Create an identity from PEM-encoded key material.
    ///
    /// Accepts both PKCS#8 (`BEGIN PRIVATE KEY`) and SEC1
    /// (`BEGIN EC PRIVATE KEY`) encodings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signing`] if the PEM does not contain a valid
    /// P-256 private key.
    pub fn from_pem(key_id: impl Into<String>, pem: &str) -> Result<Self> {
        let secret = SecretKey::from_pkcs8_pem(pem)
            .or_else(|_| SecretKey::from_sec1_pem(pem))
            .map_err(|e| Error::signing(format!("unusable key material: {e}")))?;
        Ok(Self::new(key_id, secret))
    }

    /// The key identifier, as registered with the provider.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub(crate) const fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

#[derive(Serialize)]
struct Header<'a> {
    alg: &'static str,
    kid: &'a str,
    typ: &'static str,
    nonce: String,
}

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    iss: &'static str,
    uris: [String; 1],
    iat: u64,
    nbf: u64,
    exp: u64,
}

/// Mint a bearer JWT authorizing a single `method host path` request.
///
/// The protected header carries a fresh 16-byte random nonce per call —
/// the provider's primary replay defense — so two credentials for the
/// same request are never identical. Nothing is cached.
///
/// # Errors
///
/// Returns [`Error::Signing`] if the system clock is unusable or
/// signature generation fails. Signing failures are fatal and must not
/// be retried.
pub fn issue_bearer_jwt(
    identity: &SigningIdentity,
    method: &str,
    host: &str,
    path: &str,
) -> Result<String> {
    let mut nonce = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut nonce);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::signing(format!("system clock before epoch: {e}")))?
        .as_secs();

    let header = Header {
        alg: "ES256",
        kid: identity.key_id(),
        typ: "JWT",
        nonce: hex::encode(nonce),
    };
    let claims = Claims {
        sub: identity.key_id(),
        iss: CLAIM_ISSUER,
        uris: [format!("{method} {host}{path}")],
        iat: now,
        nbf: now,
        exp: now + CREDENTIAL_TTL_SECS,
    };

    let encode = |json: serde_json::Result<Vec<u8>>| {
        json.map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
            .map_err(|e| Error::signing(format!("claim serialization failed: {e}")))
    };
    let header_b64 = encode(serde_json::to_vec(&header))?;
    let claims_b64 = encode(serde_json::to_vec(&claims))?;
    let signing_input = format!("{header_b64}.{claims_b64}");

    let key = SigningKey::from(identity.secret());
    let signature: Signature = key
        .try_sign(signing_input.as_bytes())
        .map_err(|e| Error::signing(format!("ES256 signature failed: {e}")))?;
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes().as_slice());

    Ok(format!("{signing_input}.{signature_b64}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use p256::ecdsa::VerifyingKey;
    use p256::ecdsa::signature::Verifier as _;

    fn test_identity() -> SigningIdentity {
        SigningIdentity::new("organizations/test/apiKeys/unit", SecretKey::random(&mut OsRng))
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn issue(identity: &SigningIdentity) -> String {
        issue_bearer_jwt(identity, "POST", "api.example.com", "/onramp/v1/token").unwrap()
    }

    #[test]
    fn produces_three_segments() {
        let jwt = issue(&test_identity());
        assert_eq!(jwt.split('.').count(), 3);
    }

    #[test]
    fn header_carries_es256_kid_and_nonce() {
        let identity = test_identity();
        let jwt = issue(&identity);
        let header = decode_segment(jwt.split('.').next().unwrap());

        assert_eq!(header["alg"], "ES256");
        assert_eq!(header["typ"], "JWT");
        assert_eq!(header["kid"], identity.key_id());
        // 16 bytes, hex encoded.
        assert_eq!(header["nonce"].as_str().unwrap().len(), 32);
    }

    #[test]
    fn claims_bind_the_single_authorized_request() {
        let identity = test_identity();
        let jwt = issue(&identity);
        let claims = decode_segment(jwt.split('.').nth(1).unwrap());

        assert_eq!(claims["sub"], identity.key_id());
        assert_eq!(claims["iss"], "cdp");
        assert_eq!(claims["uris"][0], "POST api.example.com/onramp/v1/token");
    }

    #[test]
    fn validity_window_is_exactly_the_ttl() {
        let jwt = issue(&test_identity());
        let claims = decode_segment(jwt.split('.').nth(1).unwrap());

        let iat = claims["iat"].as_u64().unwrap();
        let nbf = claims["nbf"].as_u64().unwrap();
        let exp = claims["exp"].as_u64().unwrap();
        assert_eq!(nbf, iat);
        assert_eq!(exp - iat, CREDENTIAL_TTL_SECS);
    }

    #[test]
    fn nonces_differ_across_issuances() {
        let identity = test_identity();
        let first = issue(&identity);
        let second = issue(&identity);

        let nonce = |jwt: &str| {
            decode_segment(jwt.split('.').next().unwrap())["nonce"]
                .as_str()
                .unwrap()
                .to_string()
        };
        assert_ne!(nonce(&first), nonce(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn signature_verifies_against_the_public_key() {
        let identity = test_identity();
        let jwt = issue(&identity);

        let mut parts = jwt.rsplitn(2, '.');
        let signature_b64 = parts.next().unwrap();
        let signing_input = parts.next().unwrap();

        let signature =
            Signature::from_slice(&URL_SAFE_NO_PAD.decode(signature_b64).unwrap()).unwrap();
        let verifying = VerifyingKey::from(&SigningKey::from(identity.secret()));
        verifying
            .verify(signing_input.as_bytes(), &signature)
            .unwrap();
    }

    #[test]
    fn rejects_garbage_pem() {
        let err = SigningIdentity::from_pem("k", "not a pem").unwrap_err();
        assert!(matches!(err, Error::Signing(_)));
    }

    #[test]
    fn debug_redacts_key_material() {
        let rendered = format!("{:?}", test_identity());
        assert!(rendered.contains("[REDACTED]"));
    }
}
