use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
};
use middleware::jwt::require_owner;
use state::State;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod entity;
mod middleware;
pub mod routes;

pub mod billing;
pub mod config;
pub mod error;
pub mod ledger;
pub mod mail;
pub mod openapi;
pub mod state;
pub mod token;

pub use axum;
pub mod auth {
    pub use crate::middleware::jwt::AuthOwner;
}

pub use sea_orm;

pub fn construct_router(state: Arc<State>) -> Router {
    let protected = Router::new()
        .nest("/auth", routes::auth::protected_routes())
        .nest("/subscription", routes::subscription::routes())
        .layer(from_fn_with_state(state.clone(), require_owner));

    let router = Router::new()
        .nest("/health", routes::health::routes())
        .nest("/auth", routes::auth::routes())
        .merge(protected)
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(CompressionLayer::new());

    Router::new().nest("/api/v1", router).merge(
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
    )
}

/// Lock CORS to the configured frontend origin. Falls back to permissive with a
/// warning when the origin does not parse as a header value.
fn cors_layer(state: &State) -> CorsLayer {
    match state.config.front_domain.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(_) => {
            tracing::warn!("FRONT_DOMAIN is not a valid origin, CORS stays permissive");
            CorsLayer::permissive()
        }
    }
}
