//! HTTP handlers

use super::models::{ClaimForm, HealthResponse, VerifyRequest, VerifyResponse};
use super::pages::Pages;
use crate::error::{Result, TruthLensError};
use crate::metrics::METRICS;
use crate::pipeline::FactChecker;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use std::sync::Arc;
use tracing::info;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<FactChecker>,
    pub pages: Arc<Pages>,
}

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    Ok(Html(state.pages.form("", None)?))
}

/// POST /
///
/// A rejected claim re-renders the form with the validation message.
pub async fn submit_claim(
    State(state): State<AppState>,
    Form(form): Form<ClaimForm>,
) -> Result<Response> {
    info!("Claim submitted via form ({} chars)", form.facts.chars().count());

    match state.checker.check(&form.facts).await {
        Ok(report) => Ok(Html(state.pages.result(&report)?).into_response()),
        Err(TruthLensError::Validation(message)) => {
            let page = state.pages.form(&form.facts, Some(&message))?;
            Ok((StatusCode::BAD_REQUEST, Html(page)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// GET /about
pub async fn about(State(state): State<AppState>) -> Result<Html<String>> {
    Ok(Html(state.pages.about()?))
}

/// POST /verify
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    info!("Claim submitted via API ({} chars)", request.claim.chars().count());

    let report = state.checker.check(&request.claim).await?;
    Ok(Json(VerifyResponse::from(&report)))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        circuits: state.checker.circuit_states(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}
