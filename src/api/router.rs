//! Router assembly

use super::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Build the application router
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    // JSON clients (browser extension, desktop and mobile apps) call from other origins
    let api = Router::new()
        .route("/verify", post(handlers::verify))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(handlers::home).post(handlers::submit_claim))
        .route("/about", get(handlers::about))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}
