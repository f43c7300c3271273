use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const MOVIES_TAG: &str = "Movies API";
pub(crate) const ACTORS_TAG: &str = "Actors API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = MOVIES_TAG, description = "Movie catalog endpoints"),
        (name = ACTORS_TAG, description = "Actor roster endpoints"),
    ),
    info(
        title = "Casting Agency API",
        description = "Casting agency backend with scope-based authorization",
        version = "1.0.0"
    )
)]
pub(crate) struct ApiDoc;
