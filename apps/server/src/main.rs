use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use restomate_api::{config::AppConfig, construct_router, state::State};
use restomate_migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Instant;

mod metrics;

async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();
    metrics::record_http_request(&method, &path, status, duration);

    response
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    metrics::init_telemetry();

    tracing::info!("Starting Restomate API Service");

    let config = AppConfig::from_env()?;
    let state = Arc::new(State::new(config).await?);

    Migrator::up(&state.db, None).await?;
    tracing::info!("Database migrations applied");

    let app = Router::new()
        .merge(construct_router(state.clone()))
        .layer(middleware::from_fn(metrics_middleware));

    let metrics_port = std::env::var("METRICS_PORT").unwrap_or_else(|_| "9090".to_string());
    let metrics_app = Router::new().route("/metrics", get(metrics::handler));

    let addr = format!("0.0.0.0:{}", state.config.port);
    let metrics_addr = format!("0.0.0.0:{}", metrics_port);

    tracing::info!("API listening on {}", addr);
    tracing::info!("Metrics listening on {}", metrics_addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr).await?;

    tokio::select! {
        res = axum::serve(listener, app) => res?,
        res = axum::serve(metrics_listener, metrics_app) => res?,
    }

    Ok(())
}
