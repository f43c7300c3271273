use crate::config::auth::AuthConfig;
use confique::Config;

pub mod auth;

/// Main configuration structure for the agency server
#[derive(Debug, Config, Clone)]
pub struct AppConfig {
    /// The port the HTTP server listens on (default: 8080)
    #[config(env = "AGENCY_PORT", default = 8080)]
    pub port: u16,

    /// Token verification configuration
    #[config(nested)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load the configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::builder()
            .env()
            .load()
            .map_err(|err| err.to_string())
    }

    #[cfg(test)]
    pub fn for_test_with_jwks(jwks_mock: &wiremock::MockServer) -> Self {
        use crate::test_utils::{TEST_AUDIENCE, TEST_ISSUER};

        Self {
            port: 0, // Let the OS choose a port
            auth: AuthConfig {
                issuer: TEST_ISSUER.to_string(),
                audience: TEST_AUDIENCE.to_string(),
                algorithm: "RS256".to_string(),
                jwks_url: Some(format!("{}/.well-known/jwks.json", jwks_mock.uri())),
                http_timeout: 2,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Process environment is shared between tests; serialize access.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn loads_from_environment_variables() {
        let _env = ENV_LOCK.lock().unwrap();
        // Clear any existing environment variables
        for (name, _value) in std::env::vars() {
            if name.starts_with("AGENCY_") {
                std::env::remove_var(name);
            }
        }
        std::env::set_var("AGENCY_AUTH_ISSUER", "https://tenant.auth0.com/");
        std::env::set_var("AGENCY_AUTH_AUDIENCE", "casting-agency");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.auth.issuer, "https://tenant.auth0.com/");
        assert_eq!(config.auth.audience, "casting-agency");
        assert_eq!(config.auth.algorithm, "RS256");
        assert_eq!(config.auth.jwks_url, None);
        assert_eq!(config.auth.http_timeout, 5);

        // Clean up
        std::env::remove_var("AGENCY_AUTH_ISSUER");
        std::env::remove_var("AGENCY_AUTH_AUDIENCE");
    }

    #[test]
    fn fails_without_the_required_issuer_and_audience() {
        let _env = ENV_LOCK.lock().unwrap();
        for (name, _value) in std::env::vars() {
            if name.starts_with("AGENCY_") {
                std::env::remove_var(name);
            }
        }
        assert!(AppConfig::from_env().is_err());
    }
}
