//! API error type with structured JSON responses.

use api_shared::{ErrorBody, ErrorDetail};
use axiom_core::ReportError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Service misconfigured: {0}")]
    Configuration(String),
    #[error("Generation service unavailable: {message}")]
    UpstreamUnavailable {
        message: String,
        status: Option<u16>,
    },
    #[error("Content refused: {0}")]
    ContentRefused(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ApiError::ContentRefused(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Configuration(_) => "CONFIGURATION",
            ApiError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            ApiError::ContentRefused(_) => "CONTENT_REFUSED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, detail) = match self {
            ApiError::BadRequest(detail) => (detail, None),
            ApiError::Configuration(detail) => {
                tracing::error!(detail, "generation service misconfigured");
                ("The report service is not configured correctly".to_string(), None)
            }
            ApiError::UpstreamUnavailable { message, status } => (
                "The report could not be generated because the generation service is unavailable"
                    .to_string(),
                Some(match status {
                    Some(status) => format!("upstream status {status}: {message}"),
                    None => message,
                }),
            ),
            ApiError::ContentRefused(reason) => (
                "The generation service returned no usable report for this request".to_string(),
                Some(reason),
            ),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                detail,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        let status = err.upstream_status();
        match err {
            ReportError::InvalidRequest(_) | ReportError::UnknownContext(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ReportError::Configuration(_)
            | ReportError::AliasFileRead(_)
            | ReportError::AliasFileParse(_) => ApiError::Configuration(err.to_string()),
            ReportError::UpstreamExhausted { .. } => ApiError::UpstreamUnavailable {
                message: err.to_string(),
                status,
            },
            ReportError::ContentRefused { ref reason, .. } => {
                ApiError::ContentRefused(reason.clone())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        tracing::warn!(status = %rejection.status(), "request rejected: {}", detail);
        ApiError::BadRequest(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axiom_core::{AttemptFailure, AttemptOutcome, GenerationAttempt};
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_bad_request_returns_400_with_code() {
        let response = ApiError::from(ReportError::UnknownContext("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"].as_str().unwrap().contains("'x'"));
    }

    #[tokio::test]
    async fn test_exhausted_upstream_returns_502_with_last_status() {
        let err = ReportError::UpstreamExhausted {
            attempts: vec![GenerationAttempt {
                model: "m".into(),
                outcome: AttemptOutcome::Failed(AttemptFailure::Transport {
                    status: Some(503),
                    detail: "busy".into(),
                }),
            }],
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "UPSTREAM_UNAVAILABLE");
        assert!(json["error"]["detail"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_content_refused_returns_422() {
        let err = ReportError::ContentRefused {
            model: "m".into(),
            reason: "prompt blocked (SAFETY)".into(),
            attempts: Vec::new(),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "CONTENT_REFUSED");
        assert_eq!(json["error"]["detail"], "prompt blocked (SAFETY)");
    }

    #[tokio::test]
    async fn test_configuration_error_hides_detail() {
        let response =
            ApiError::from(ReportError::Configuration("GOOGLE_API_KEY must be set".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "CONFIGURATION");
        assert!(json["error"].get("detail").is_none());
        assert!(!json.to_string().contains("GOOGLE_API_KEY"));
    }
}
