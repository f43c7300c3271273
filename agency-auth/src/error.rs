use http::StatusCode;
use thiserror::Error;

/// Rejection raised by the authorization core.
///
/// Every failure is a value carried up to the HTTP boundary; the core never
/// writes to a response channel itself and never uses errors for normal
/// control flow. Descriptions name the check that failed precisely enough
/// for client debugging without exposing key material.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The `Authorization` header is absent or not `Bearer <token>`.
    #[error("authorization header is missing or not a bearer token")]
    MissingAuthHeader,

    /// The token is not a decodable three-segment JWT, lacks a key id, or
    /// declares an algorithm other than the one configured.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The issuer's key endpoint was unreachable or returned an unusable
    /// document.
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),

    /// No cached signing key matches the token's declared key id, even
    /// after a fresh fetch.
    #[error("no signing key found for key id {0:?}")]
    KeyNotFound(String),

    /// Signature or standard-claim verification failed.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The verified payload is missing the permissions claim. The issuer
    /// is expected to embed permissions, so this is a configuration error
    /// upstream rather than an empty grant.
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// The caller is authenticated but the required permission is not in
    /// the token's grant set.
    #[error("permission {0:?} is not granted")]
    InsufficientScope(String),
}

impl AuthError {
    /// HTTP status the boundary should respond with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidClaims(_) => StatusCode::BAD_REQUEST,
            AuthError::InsufficientScope(_) => StatusCode::FORBIDDEN,
            AuthError::MissingAuthHeader
            | AuthError::MalformedToken(_)
            | AuthError::KeyFetch(_)
            | AuthError::KeyNotFound(_)
            | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable machine-readable code for the boundary error body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "authorization_header_missing",
            AuthError::MalformedToken(_) => "invalid_header",
            AuthError::KeyFetch(_) => "key_fetch_failed",
            AuthError::KeyNotFound(_) => "key_not_found",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::InsufficientScope(_) => "insufficient_scope",
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
