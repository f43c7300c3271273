//! Authorization core for the casting-agency backend.
//!
//! Verifies externally-issued RS256 bearer tokens against the issuer's
//! published signing keys and enforces scope-based access per route. The
//! crate never issues or refreshes tokens; its only outbound call is the
//! key fetch.

pub mod error;
pub mod jwks;
pub mod keys;
pub mod permission;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AuthError, AuthResult};
pub use jwks::{Jwk, Jwks, KeySet, VerificationKey};
pub use keys::KeyProvider;
pub use permission::require_permission;
pub use token::{Audience, Claims, TokenVerifier};

use jsonwebtoken::Algorithm;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Verification parameters supplied by the embedding application.
///
/// All of these come from the environment; none are hardcoded.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Expected `iss` claim, e.g. `https://tenant.auth0.com/`.
    pub issuer: String,
    /// Expected `aud` claim (API identifier).
    pub audience: String,
    /// JWA name of the single trusted asymmetric algorithm, e.g. `RS256`.
    pub algorithm: String,
    /// Key endpoint override; derived from the issuer when absent.
    pub jwks_url: Option<String>,
    /// Bound on the outbound key fetch.
    pub http_timeout: Duration,
}

impl AuthSettings {
    /// The key endpoint to fetch from: the explicit override, or the
    /// issuer's well-known location.
    pub fn resolved_jwks_url(&self) -> String {
        self.jwks_url.clone().unwrap_or_else(|| {
            format!(
                "{}/.well-known/jwks.json",
                self.issuer.trim_end_matches('/')
            )
        })
    }
}

/// The single entry point surrounding a route: bearer extraction, token
/// verification, then permission enforcement, short-circuiting on the
/// first failure.
///
/// Safe to share across concurrent requests; the only shared mutable state
/// is the key cache inside [`KeyProvider`].
#[derive(Debug)]
pub struct Authorizer {
    verifier: TokenVerifier,
}

impl Authorizer {
    /// Build an authorizer, validating the configured algorithm and key
    /// endpoint.
    ///
    /// Symmetric algorithms are refused outright: tokens here are issued
    /// by an external party and must be verifiable from public key
    /// material alone.
    pub fn new(settings: AuthSettings) -> Result<Self, String> {
        let algorithm = Algorithm::from_str(&settings.algorithm)
            .map_err(|_| format!("unknown signing algorithm {:?}", settings.algorithm))?;
        if matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(format!(
                "refusing symmetric algorithm {:?}; issuer tokens must use an asymmetric algorithm",
                settings.algorithm
            ));
        }

        let jwks_url = settings.resolved_jwks_url();
        url::Url::parse(&jwks_url).map_err(|err| format!("invalid key endpoint {jwks_url:?}: {err}"))?;

        let keys = KeyProvider::new(jwks_url, algorithm, settings.http_timeout)
            .map_err(|err| format!("failed to initialize key provider: {err}"))?;
        let verifier = TokenVerifier::new(
            settings.issuer,
            settings.audience,
            algorithm,
            Arc::new(keys),
        );
        Ok(Self { verifier })
    }

    /// Authorize one request against one required permission.
    ///
    /// On success the verified claims are returned for optional use by the
    /// caller (e.g. subject identity); nothing else is mutated.
    pub async fn authorize(
        &self,
        authorization_header: Option<&str>,
        required_permission: &str,
    ) -> AuthResult<Claims> {
        let token = extract_bearer_token(authorization_header)?;
        let claims = self.verifier.verify(token).await?;
        require_permission(&claims, required_permission)?;
        Ok(claims)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively; everything else about the
/// header is strict.
fn extract_bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let value = header.ok_or(AuthError::MissingAuthHeader)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MissingAuthHeader)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }
    Ok(token)
}
