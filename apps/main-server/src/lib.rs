//! SkillKonnect server
//!
//! HTTP backend of the SkillKonnect skill-exchange app: profiles, the skill
//! catalogue, mentorship requests, chat, tasks and ratings, all behind
//! bearer-token authentication.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use auth::{JwtConfig, JwtManager, MemoryRevocationStore};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use doc_store::DocumentStore;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::auth_middleware;
use crate::services::blob_store::LocalBlobStore;
use crate::state::AppState;

/// Request body limit; leaves room for a base64 encoded profile photo.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Creates the application router with all routes configured.
pub fn create_app<S: DocumentStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(&state.config.storage_dir);

    api::create_router()
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ))
        .route("/health", get(api::health_check))
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: DocumentStore>(config: Config, store: S) -> Arc<AppState<S>> {
    let jwt_config = JwtConfig::new(config.jwt_secret.clone())
        .with_issuer(config.jwt_issuer.clone())
        .with_expiration_hours(config.jwt_expiration_hours);
    let blobs = LocalBlobStore::new(
        config.storage_dir.clone(),
        format!("{}/uploads", config.public_url.trim_end_matches('/')),
    );

    Arc::new(AppState::new(
        config,
        store,
        JwtManager::new(jwt_config),
        Box::new(MemoryRevocationStore::new()),
        Arc::new(blobs),
    ))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
