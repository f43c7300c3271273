use crate::error::{AuthError, AuthResult};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single key entry from the issuer's published key document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_field: Option<String>,
    #[serde(default)]
    pub n: String,
    #[serde(default)]
    pub e: String,
}

/// The issuer's full key document, as served by its JWKS endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// A public key resolved from the JWKS, ready for signature verification.
#[derive(Clone)]
pub struct VerificationKey {
    pub kid: String,
    pub decoding_key: DecodingKey,
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

/// Immutable snapshot of the issuer's current signing keys, keyed by `kid`.
///
/// A snapshot is built once from a fetched document and replaced wholesale
/// on refresh, never mutated in place.
#[derive(Debug, Default)]
pub struct KeySet {
    keys: HashMap<String, VerificationKey>,
}

impl KeySet {
    /// Build a key set from a fetched key document.
    ///
    /// Entries that are not RSA keys, or that declare an algorithm other
    /// than `algorithm`, are skipped. A document yielding zero usable keys
    /// is unusable and reported as a fetch failure.
    pub fn from_jwks(jwks: &Jwks, algorithm: Algorithm) -> AuthResult<Self> {
        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            if let Some(alg) = &jwk.alg {
                if alg != algorithm_name(algorithm) {
                    continue;
                }
            }
            let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|err| {
                AuthError::KeyFetch(format!("unusable key {:?} in document: {err}", jwk.kid))
            })?;
            keys.insert(
                jwk.kid.clone(),
                VerificationKey {
                    kid: jwk.kid.clone(),
                    decoding_key,
                },
            );
        }
        if keys.is_empty() {
            return Err(AuthError::KeyFetch(
                "key document contains no usable signing keys".to_string(),
            ));
        }
        Ok(Self { keys })
    }

    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// JWA name for an algorithm, as it appears in `alg` fields on the wire.
pub(crate) fn algorithm_name(alg: Algorithm) -> &'static str {
    match alg {
        Algorithm::HS256 => "HS256",
        Algorithm::HS384 => "HS384",
        Algorithm::HS512 => "HS512",
        Algorithm::RS256 => "RS256",
        Algorithm::RS384 => "RS384",
        Algorithm::RS512 => "RS512",
        Algorithm::ES256 => "ES256",
        Algorithm::ES384 => "ES384",
        Algorithm::PS256 => "PS256",
        Algorithm::PS384 => "PS384",
        Algorithm::PS512 => "PS512",
        Algorithm::EdDSA => "EdDSA",
    }
}
