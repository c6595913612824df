use axum::Router;
use domain_pricing::handlers;

pub fn router(state: &crate::state::AppState) -> Router {
    handlers::router(state.pricing.clone())
}
