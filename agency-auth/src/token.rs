use crate::error::{AuthError, AuthResult};
use crate::jwks::algorithm_name;
use crate::keys::KeyProvider;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Claims carried by a verified bearer token.
///
/// Reconstructed per request from the token payload; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: Audience,
    pub sub: String,
    pub exp: i64,
    pub permissions: Vec<String>,
}

/// The `aud` claim, which issuers publish as a single value or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Payload shape as decoded from the wire; `permissions` may be absent,
/// which [`TokenVerifier::verify`] turns into an explicit rejection.
#[derive(Debug, Deserialize)]
struct RawClaims {
    iss: String,
    aud: Audience,
    sub: String,
    exp: i64,
    permissions: Option<Vec<String>>,
}

/// Transforms an opaque bearer-token string into validated [`Claims`].
///
/// Verification is pinned to a single asymmetric algorithm and to the
/// configured issuer and audience; every other algorithm (including
/// `none`) is rejected before any key material is touched.
#[derive(Debug)]
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    algorithm: Algorithm,
    keys: Arc<KeyProvider>,
}

impl TokenVerifier {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithm: Algorithm,
        keys: Arc<KeyProvider>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm,
            keys,
        }
    }

    /// Verify a bearer token and extract its claims.
    ///
    /// The only side effect is the key fetch on a cache miss; verification
    /// itself is deterministic.
    pub async fn verify(&self, token: &str) -> AuthResult<Claims> {
        check_structure(token)?;

        let header = decode_header(token)
            .map_err(|err| AuthError::MalformedToken(format!("undecodable header: {err}")))?;
        if header.alg != self.algorithm {
            return Err(AuthError::MalformedToken(format!(
                "algorithm {} is not accepted, only {} tokens are trusted",
                algorithm_name(header.alg),
                algorithm_name(self.algorithm),
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::MalformedToken("header is missing a key id".to_string()))?;

        let key = self.keys.get_signing_key(&kid).await?;

        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation
            .required_spec_claims
            .extend(["iss".to_string(), "aud".to_string()]);
        validation.leeway = 0;

        let data =
            decode::<RawClaims>(token, &key.decoding_key, &validation).map_err(map_decode_error)?;
        let raw = data.claims;
        let permissions = raw.permissions.ok_or_else(|| {
            AuthError::InvalidClaims("token is missing the permissions claim".to_string())
        })?;

        Ok(Claims {
            iss: raw.iss,
            aud: raw.aud,
            sub: raw.sub,
            exp: raw.exp,
            permissions,
        })
    }
}

/// A token must be exactly three non-empty dot-separated segments before
/// anything is decoded.
fn check_structure(token: &str) -> AuthResult<()> {
    let mut segments = token.split('.');
    let well_formed = segments.by_ref().take(3).filter(|s| !s.is_empty()).count() == 3
        && segments.next().is_none();
    if !well_formed {
        return Err(AuthError::MalformedToken(
            "token is not a three-segment JWT".to_string(),
        ));
    }
    Ok(())
}

/// Map verification failures to the rejection taxonomy, naming the check
/// that failed.
fn map_decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::InvalidToken("token is expired".to_string()),
        ErrorKind::ImmatureSignature => {
            AuthError::InvalidToken("token is not yet valid".to_string())
        }
        ErrorKind::InvalidIssuer => {
            AuthError::InvalidToken("token issuer is not trusted".to_string())
        }
        ErrorKind::InvalidAudience => {
            AuthError::InvalidToken("token audience does not match".to_string())
        }
        ErrorKind::InvalidSignature => {
            AuthError::InvalidToken("token signature does not verify".to_string())
        }
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidToken(format!("token is missing the {claim} claim"))
        }
        ErrorKind::InvalidAlgorithm => {
            AuthError::MalformedToken("token algorithm is not accepted".to_string())
        }
        ErrorKind::Json(_) => AuthError::InvalidClaims("claims payload is malformed".to_string()),
        _ => AuthError::InvalidToken(format!("token rejected: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        mint_token, now_epoch, test_jwks_body, TokenSpec, OTHER_RSA_PRIVATE_KEY, TEST_AUDIENCE,
        TEST_ISSUER, TEST_KID,
    };
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JWKS_PATH: &str = "/.well-known/jwks.json";

    async fn verifier_with_jwks(server: &MockServer) -> TokenVerifier {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(test_jwks_body(TEST_KID)))
            .mount(server)
            .await;
        let keys = KeyProvider::new(
            format!("{}{}", server.uri(), JWKS_PATH),
            Algorithm::RS256,
            Duration::from_secs(2),
        )
        .expect("provider");
        TokenVerifier::new(TEST_ISSUER, TEST_AUDIENCE, Algorithm::RS256, Arc::new(keys))
    }

    #[tokio::test]
    async fn accepts_a_well_formed_token_and_extracts_permissions() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let token = mint_token(TokenSpec::valid(&["get:movies", "post:movies"]));
        let claims = verifier.verify(&token).await.expect("verified claims");

        assert_eq!(claims.iss, TEST_ISSUER);
        assert_eq!(claims.sub, "auth0|producer");
        assert_eq!(claims.permissions, vec!["get:movies", "post:movies"]);
    }

    #[tokio::test]
    async fn rejects_an_expired_token() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let mut spec = TokenSpec::valid(&["get:movies"]);
        spec.exp = now_epoch() - 600;
        let token = mint_token(spec);

        let err = verifier.verify(&token).await.expect_err("expired");
        assert!(matches!(&err, AuthError::InvalidToken(msg) if msg.contains("expired")));
    }

    #[tokio::test]
    async fn rejects_a_token_from_an_untrusted_issuer() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let mut spec = TokenSpec::valid(&["get:movies"]);
        spec.issuer = "https://somewhere-else.example.com/".to_string();
        let token = mint_token(spec);

        let err = verifier.verify(&token).await.expect_err("wrong issuer");
        assert!(matches!(&err, AuthError::InvalidToken(msg) if msg.contains("issuer")));
    }

    #[tokio::test]
    async fn rejects_a_token_for_a_different_audience() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let mut spec = TokenSpec::valid(&["get:movies"]);
        spec.audience = "another-api".to_string();
        let token = mint_token(spec);

        let err = verifier.verify(&token).await.expect_err("wrong audience");
        assert!(matches!(&err, AuthError::InvalidToken(msg) if msg.contains("audience")));
    }

    #[tokio::test]
    async fn accepts_an_audience_list_containing_the_configured_audience() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let mut spec = TokenSpec::valid(&["get:movies"]);
        spec.audience_list = Some(vec![TEST_AUDIENCE.to_string(), "userinfo".to_string()]);
        let token = mint_token(spec);

        let claims = verifier.verify(&token).await.expect("audience list");
        assert_eq!(
            claims.aud,
            Audience::Many(vec![TEST_AUDIENCE.to_string(), "userinfo".to_string()])
        );
    }

    #[tokio::test]
    async fn rejects_a_token_signed_with_the_wrong_key() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        // Signed by a key the issuer never published, under the trusted kid.
        let mut spec = TokenSpec::valid(&["get:movies"]);
        spec.private_key_pem = OTHER_RSA_PRIVATE_KEY;
        let token = mint_token(spec);

        let err = verifier.verify(&token).await.expect_err("wrong key");
        assert!(matches!(&err, AuthError::InvalidToken(msg) if msg.contains("signature")));
    }

    #[tokio::test]
    async fn rejects_a_token_without_a_key_id() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let mut spec = TokenSpec::valid(&["get:movies"]);
        spec.kid = None;
        let token = mint_token(spec);

        let err = verifier.verify(&token).await.expect_err("no kid");
        assert!(matches!(&err, AuthError::MalformedToken(msg) if msg.contains("key id")));
    }

    #[tokio::test]
    async fn rejects_a_symmetric_token_before_key_lookup() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(TEST_KID.to_string());
        let claims = serde_json::json!({
            "iss": TEST_ISSUER,
            "aud": TEST_AUDIENCE,
            "sub": "auth0|forger",
            "exp": now_epoch() + 600,
            "permissions": ["get:movies"],
        });
        let token = encode(&header, &claims, &EncodingKey::from_secret(b"guessable"))
            .expect("hs256 token");

        let err = verifier.verify(&token).await.expect_err("hs256");
        assert!(matches!(&err, AuthError::MalformedToken(msg) if msg.contains("HS256")));
    }

    #[tokio::test]
    async fn rejects_an_unsigned_none_token() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "iss": TEST_ISSUER,
                "aud": TEST_AUDIENCE,
                "sub": "auth0|forger",
                "exp": now_epoch() + 600,
                "permissions": ["get:movies"],
            })
            .to_string(),
        );
        let forged = format!("{header}.{payload}.forged");

        let err = verifier.verify(&forged).await.expect_err("alg none");
        assert!(matches!(err, AuthError::MalformedToken(_)));
    }

    #[tokio::test]
    async fn rejects_a_token_missing_the_permissions_claim() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let mut spec = TokenSpec::valid(&[]);
        spec.permissions = None;
        let token = mint_token(spec);

        let err = verifier.verify(&token).await.expect_err("no permissions claim");
        assert!(matches!(&err, AuthError::InvalidClaims(msg) if msg.contains("permissions")));
    }

    #[tokio::test]
    async fn accepts_an_empty_permissions_list_as_a_valid_grant() {
        let server = MockServer::start().await;
        let verifier = verifier_with_jwks(&server).await;

        let token = mint_token(TokenSpec::valid(&[]));
        let claims = verifier.verify(&token).await.expect("empty grant");
        assert!(claims.permissions.is_empty());
    }

    #[test]
    fn structural_check_requires_three_non_empty_segments() {
        for garbage in ["", "not-a-jwt", "a.b", "a.b.c.d", "a..c", ".b.c", "a.b."] {
            let err = check_structure(garbage).expect_err(garbage);
            assert!(matches!(err, AuthError::MalformedToken(_)), "{garbage}");
        }
        assert!(check_structure("a.b.c").is_ok());
    }
}
