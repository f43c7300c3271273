use crate::api::authorize;
use crate::errors::ApiError;
use crate::models::{Actor, Deleted};
use crate::openapi::ACTORS_TAG;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::routing::{get, patch};
use axum::Router;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Creates a router for the actor roster routes
pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/actors", get(list_actors).post(create_actor))
        .route("/actors/{id}", patch(update_actor).delete(delete_actor))
}

/// Request body for adding an actor; every field is required
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub(crate) struct NewActor {
    name: Option<String>,
    year_of_birth: Option<i32>,
    gender: Option<String>,
    nationality: Option<String>,
    bio: Option<String>,
}

/// Request body for partially updating an actor
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub(crate) struct ActorUpdate {
    name: Option<String>,
    year_of_birth: Option<i32>,
    gender: Option<String>,
    nationality: Option<String>,
    bio: Option<String>,
}

/// Response body listing the whole roster
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ActorList {
    success: bool,
    actors: Vec<Actor>,
    total_actors: usize,
}

/// Response body carrying a single actor
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ActorResponse {
    success: bool,
    actor: Actor,
}

#[utoipa::path(
    get,
    path = "/actors",
    tag = ACTORS_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token with the get:actors permission"),
    ),
    responses(
        (status = 200, description = "The actor roster", body = ActorList),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the get:actors permission"),
        (status = 404, description = "The roster is empty")
    )
)]
pub(super) async fn list_actors(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ActorList>, ApiError> {
    authorize(&state, &headers, "get:actors").await?;

    let actors = state.actors.list();
    if actors.is_empty() {
        return Err(ApiError::not_found("resource not found"));
    }
    let total_actors = actors.len();
    Ok(Json(ActorList {
        success: true,
        actors,
        total_actors,
    }))
}

#[utoipa::path(
    post,
    path = "/actors",
    tag = ACTORS_TAG,
    request_body = NewActor,
    params(
        ("Authorization" = String, Header, description = "Bearer token with the post:actors permission"),
    ),
    responses(
        (status = 200, description = "Actor added", body = ActorResponse),
        (status = 400, description = "A required field is missing"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the post:actors permission"),
        (status = 422, description = "Request body is not valid JSON")
    )
)]
pub(super) async fn create_actor(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NewActor>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    authorize(&state, &headers, "post:actors").await?;

    let Json(body) = body.map_err(|_| ApiError::unprocessable("unprocessable"))?;
    let (name, year_of_birth, gender, nationality, bio) = match (
        non_empty(body.name),
        body.year_of_birth,
        non_empty(body.gender),
        non_empty(body.nationality),
        non_empty(body.bio),
    ) {
        (Some(name), Some(year_of_birth), Some(gender), Some(nationality), Some(bio)) => {
            (name, year_of_birth, gender, nationality, bio)
        }
        _ => return Err(ApiError::bad_request("bad request")),
    };

    let actor = state.actors.insert_with(|id| Actor {
        id,
        name,
        year_of_birth,
        gender,
        nationality,
        bio,
    });
    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

#[utoipa::path(
    patch,
    path = "/actors/{id}",
    tag = ACTORS_TAG,
    request_body = ActorUpdate,
    params(
        ("id" = i64, Path, description = "Actor identifier"),
        ("Authorization" = String, Header, description = "Bearer token with the patch:actors permission"),
    ),
    responses(
        (status = 200, description = "Actor updated", body = ActorResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the patch:actors permission"),
        (status = 404, description = "No actor with this id"),
        (status = 422, description = "Request body is not valid JSON")
    )
)]
pub(super) async fn update_actor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Result<Json<ActorUpdate>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    authorize(&state, &headers, "patch:actors").await?;

    let Json(body) = body.map_err(|_| ApiError::unprocessable("unprocessable"))?;
    let actor = state
        .actors
        .update(id, |actor| {
            if let Some(name) = body.name.clone() {
                actor.name = name;
            }
            if let Some(year_of_birth) = body.year_of_birth {
                actor.year_of_birth = year_of_birth;
            }
            if let Some(gender) = body.gender.clone() {
                actor.gender = gender;
            }
            if let Some(nationality) = body.nationality.clone() {
                actor.nationality = nationality;
            }
            if let Some(bio) = body.bio.clone() {
                actor.bio = bio;
            }
        })
        .ok_or_else(|| ApiError::not_found("resource not found"))?;

    Ok(Json(ActorResponse {
        success: true,
        actor,
    }))
}

#[utoipa::path(
    delete,
    path = "/actors/{id}",
    tag = ACTORS_TAG,
    params(
        ("id" = i64, Path, description = "Actor identifier"),
        ("Authorization" = String, Header, description = "Bearer token with the delete:actors permission"),
    ),
    responses(
        (status = 200, description = "Actor removed", body = Deleted),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the delete:actors permission"),
        (status = 404, description = "No actor with this id")
    )
)]
pub(super) async fn delete_actor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Deleted>, ApiError> {
    authorize(&state, &headers, "delete:actors").await?;

    state
        .actors
        .remove(id)
        .ok_or_else(|| ApiError::not_found("resource not found"))?;
    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

/// Treat missing and empty strings alike; both fail required-field checks.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
