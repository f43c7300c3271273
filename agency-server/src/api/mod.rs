pub(crate) mod actors;
pub(crate) mod health;
pub(crate) mod movies;

use crate::errors::ApiError;
use crate::state::AppState;
use agency_auth::Claims;
use axum::Router;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use log::warn;

/// Combines all API routes into a single router
pub(super) fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(movies::router())
        .merge(actors::router())
}

/// Authorize one request against the route's required permission.
///
/// Handlers call this before touching any state; on success the verified
/// claims are available to the handler, on failure the rejection is
/// rendered at the boundary in the standard error shape.
pub(crate) async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    required_permission: &str,
) -> Result<Claims, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    state
        .authorizer
        .authorize(header, required_permission)
        .await
        .map_err(|err| {
            warn!("request for {required_permission:?} rejected: {err}");
            ApiError::from(err)
        })
}
