// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::models::error::{ErrorResponse, ScrapeError};
use crate::models::health::HealthResponse;
use crate::models::report::{AggregateReport, ClassReport, UrlError, UrlErrorKind, UrlResult};
use crate::models::request::ScrapeRequest;
use crate::services::orchestrator::Orchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `SCRAPE_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("SCRAPE_VERSION");

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health - Service status and engine availability.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service status", body = HealthResponse))
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine_available = state.orchestrator.engine_available();
    Json(HealthResponse {
        status: if engine_available {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        version: VERSION.to_string(),
        engine_available,
    })
}

/// POST /scrape - Scrape a batch of URLs across egress classes.
#[utoipa::path(
    post,
    path = "/scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Per-URL outcomes and timing", body = AggregateReport),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Engine executable unavailable", body = ErrorResponse)
    )
)]
pub async fn scrape_handler(
    State(state): State<AppState>,
    Json(payload): Json<ScrapeRequest>,
) -> Result<Json<AggregateReport>, (StatusCode, Json<ErrorResponse>)> {
    state
        .orchestrator
        .run(&payload)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

fn error_response(err: &ScrapeError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        ScrapeError::Validation(_) => StatusCode::BAD_REQUEST,
        ScrapeError::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ErrorResponse::from(err)))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(health_handler, scrape_handler),
    components(schemas(
        ScrapeRequest,
        AggregateReport,
        ClassReport,
        UrlResult,
        UrlError,
        UrlErrorKind,
        HealthResponse,
        ErrorResponse
    ))
)]
pub struct ApiDoc;

/// Build the Axum application router, including the OpenAPI document and Swagger UI.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/scrape", post(scrape_handler))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
