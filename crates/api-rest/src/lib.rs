//! # API REST
//!
//! REST API implementation for Axiom.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! Uses `api-shared` for common types and `axiom-core` for the report pipeline.

#![warn(rust_2018_idioms)]

pub mod error;

use api_shared::{
    ErrorBody, ErrorDetail, GenerateReportReq, GenerateReportRes, HealthRes, HealthService,
};
use axiom_core::ReportService;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(report_service: ReportService) -> Self {
        Self { report_service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, generate_report),
    components(schemas(
        HealthRes,
        GenerateReportReq,
        GenerateReportRes,
        ErrorBody,
        ErrorDetail
    ))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate_report))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = GenerateReportReq,
    responses(
        (status = 200, description = "Generated report", body = GenerateReportRes),
        (status = 400, description = "Malformed body or unknown context", body = ErrorBody),
        (status = 422, description = "Generation service returned no usable content", body = ErrorBody),
        (status = 500, description = "Service misconfigured", body = ErrorBody),
        (status = 502, description = "Generation service unavailable", body = ErrorBody)
    )
)]
/// Generate a clinical report
///
/// Normalises the form fields for the requested context, composes the prompt, calls the
/// generation service (with one fallback model) and splits the output into report,
/// recommendations and keywords.
///
/// # Errors
/// Returns an [`ApiError`] if:
/// - the body is not a JSON object or the context is missing or unknown (400),
/// - the generation service rejected the credential (500),
/// - every model failed at the transport level (502), or
/// - the generation service returned no usable text (422).
#[axum::debug_handler]
async fn generate_report(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<GenerateReportRes>, ApiError> {
    let Json(body) = body?;
    let parsed = state.report_service.generate_from_json(body).await?;
    Ok(Json(parsed.into()))
}
