use crate::config::AppConfig;
use crate::models::{Actor, Movie};
use crate::store::Store;
use agency_auth::Authorizer;
use std::sync::Arc;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub authorizer: Arc<Authorizer>,
    pub movies: Store<Movie>,
    pub actors: Store<Actor>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, String> {
        let authorizer = Authorizer::new(config.auth.to_settings())?;
        Ok(Self {
            config: Arc::new(config),
            authorizer: Arc::new(authorizer),
            movies: Store::new(),
            actors: Store::new(),
        })
    }
}
