//! Token verification configuration

use agency_auth::AuthSettings;
use confique::Config;
use std::time::Duration;

/// Parameters for verifying issuer-signed bearer tokens. Issuer and
/// audience have no sensible defaults and must be provided.
#[derive(Debug, Config, Clone)]
pub struct AuthConfig {
    /// Token issuer URL, e.g. https://tenant.auth0.com/
    #[config(env = "AGENCY_AUTH_ISSUER")]
    pub issuer: String,

    /// API identifier expected in the token's audience claim
    #[config(env = "AGENCY_AUTH_AUDIENCE")]
    pub audience: String,

    /// Signing algorithm accepted from the issuer (default: RS256)
    #[config(env = "AGENCY_AUTH_ALGORITHM", default = "RS256")]
    pub algorithm: String,

    /// Key endpoint override
    /// (default: derived as <issuer>/.well-known/jwks.json)
    #[config(env = "AGENCY_AUTH_JWKS_URL")]
    pub jwks_url: Option<String>,

    /// Timeout for signing-key fetches in seconds (default: 5)
    #[config(env = "AGENCY_AUTH_HTTP_TIMEOUT", default = 5)]
    pub http_timeout: u64,
}

impl AuthConfig {
    /// Translate into the authorization core's settings.
    pub fn to_settings(&self) -> AuthSettings {
        AuthSettings {
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            algorithm: self.algorithm.clone(),
            jwks_url: self.jwks_url.clone(),
            http_timeout: Duration::from_secs(self.http_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_every_field_over() {
        let config = AuthConfig {
            issuer: "https://tenant.auth0.com/".to_string(),
            audience: "casting-agency".to_string(),
            algorithm: "RS256".to_string(),
            jwks_url: Some("https://keys.example.com/jwks.json".to_string()),
            http_timeout: 7,
        };
        let settings = config.to_settings();
        assert_eq!(settings.issuer, config.issuer);
        assert_eq!(settings.audience, config.audience);
        assert_eq!(settings.algorithm, config.algorithm);
        assert_eq!(settings.jwks_url, config.jwks_url);
        assert_eq!(settings.http_timeout, Duration::from_secs(7));
    }
}
