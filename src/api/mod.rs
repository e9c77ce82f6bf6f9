//! HTTP surface: HTML pages, the JSON verify endpoint, health and metrics

pub mod handlers;
pub mod models;
pub mod pages;
pub mod router;

pub use handlers::AppState;
pub use pages::Pages;
pub use router::build_router;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::FactChecker;
use axum::Router;
use std::sync::Arc;

/// Build the router for a fact checker using the server settings in `config`
pub fn app(checker: Arc<FactChecker>, config: &Config) -> Result<Router> {
    let state = AppState {
        checker,
        pages: Arc::new(Pages::new(config.server.max_claim_chars)?),
    };
    Ok(build_router(state, config.server.max_body_bytes))
}
