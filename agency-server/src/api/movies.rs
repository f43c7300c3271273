use crate::api::authorize;
use crate::errors::ApiError;
use crate::models::{Deleted, Movie};
use crate::openapi::MOVIES_TAG;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::routing::{get, patch};
use axum::Router;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Creates a router for the movie catalog routes
pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/{id}", patch(update_movie).delete(delete_movie))
}

/// Request body for creating a movie; every field is required
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub(crate) struct NewMovie {
    title: Option<String>,
    genre: Option<String>,
    rating: Option<f64>,
    description: Option<String>,
}

/// Request body for partially updating a movie
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub(crate) struct MovieUpdate {
    title: Option<String>,
    genre: Option<String>,
    rating: Option<f64>,
    description: Option<String>,
}

/// Response body listing the whole catalog
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MovieList {
    success: bool,
    movies: Vec<Movie>,
    total_movies: usize,
}

/// Response body carrying a single movie
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MovieResponse {
    success: bool,
    movie: Movie,
}

#[utoipa::path(
    get,
    path = "/movies",
    tag = MOVIES_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token with the get:movies permission"),
    ),
    responses(
        (status = 200, description = "The movie catalog", body = MovieList),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the get:movies permission"),
        (status = 404, description = "The catalog is empty")
    )
)]
pub(super) async fn list_movies(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MovieList>, ApiError> {
    authorize(&state, &headers, "get:movies").await?;

    let movies = state.movies.list();
    if movies.is_empty() {
        return Err(ApiError::not_found("resource not found"));
    }
    let total_movies = movies.len();
    Ok(Json(MovieList {
        success: true,
        movies,
        total_movies,
    }))
}

#[utoipa::path(
    post,
    path = "/movies",
    tag = MOVIES_TAG,
    request_body = NewMovie,
    params(
        ("Authorization" = String, Header, description = "Bearer token with the post:movies permission"),
    ),
    responses(
        (status = 200, description = "Movie created", body = MovieResponse),
        (status = 400, description = "A required field is missing"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the post:movies permission"),
        (status = 422, description = "Request body is not valid JSON")
    )
)]
pub(super) async fn create_movie(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NewMovie>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    authorize(&state, &headers, "post:movies").await?;

    let Json(body) = body.map_err(|_| ApiError::unprocessable("unprocessable"))?;
    let (title, genre, rating, description) = match (
        non_empty(body.title),
        non_empty(body.genre),
        body.rating,
        non_empty(body.description),
    ) {
        (Some(title), Some(genre), Some(rating), Some(description)) => {
            (title, genre, rating, description)
        }
        _ => return Err(ApiError::bad_request("bad request")),
    };

    let movie = state.movies.insert_with(|id| Movie {
        id,
        title,
        genre,
        rating,
        description,
    });
    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

#[utoipa::path(
    patch,
    path = "/movies/{id}",
    tag = MOVIES_TAG,
    request_body = MovieUpdate,
    params(
        ("id" = i64, Path, description = "Movie identifier"),
        ("Authorization" = String, Header, description = "Bearer token with the patch:movies permission"),
    ),
    responses(
        (status = 200, description = "Movie updated", body = MovieResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the patch:movies permission"),
        (status = 404, description = "No movie with this id"),
        (status = 422, description = "Request body is not valid JSON")
    )
)]
pub(super) async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Result<Json<MovieUpdate>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    authorize(&state, &headers, "patch:movies").await?;

    let Json(body) = body.map_err(|_| ApiError::unprocessable("unprocessable"))?;
    let movie = state
        .movies
        .update(id, |movie| {
            if let Some(title) = body.title.clone() {
                movie.title = title;
            }
            if let Some(genre) = body.genre.clone() {
                movie.genre = genre;
            }
            if let Some(rating) = body.rating {
                movie.rating = rating;
            }
            if let Some(description) = body.description.clone() {
                movie.description = description;
            }
        })
        .ok_or_else(|| ApiError::not_found("resource not found"))?;

    Ok(Json(MovieResponse {
        success: true,
        movie,
    }))
}

#[utoipa::path(
    delete,
    path = "/movies/{id}",
    tag = MOVIES_TAG,
    params(
        ("id" = i64, Path, description = "Movie identifier"),
        ("Authorization" = String, Header, description = "Bearer token with the delete:movies permission"),
    ),
    responses(
        (status = 200, description = "Movie removed", body = Deleted),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the delete:movies permission"),
        (status = 404, description = "No movie with this id")
    )
)]
pub(super) async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Deleted>, ApiError> {
    authorize(&state, &headers, "delete:movies").await?;

    state
        .movies
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
