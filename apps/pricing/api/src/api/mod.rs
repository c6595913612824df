use axum::{Router, middleware, routing::get};
use observability::{metrics_handler, metrics_middleware};

pub mod health;
pub mod pricing;

/// API routes without the `/api` prefix; `create_router` adds it
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest("/pricing", pricing::router(state))
        .layer(middleware::from_fn(metrics_middleware))
}

/// `/ready` with real dependency checks, plus the Prometheus scrape endpoint
pub fn ops_router(state: crate::state::AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
        .route("/metrics", get(metrics_handler))
}
