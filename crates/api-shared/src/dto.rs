//! JSON bodies exchanged over the REST API.

use std::collections::BTreeMap;

use axiom_core::ParsedResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Report generation request, documentation shape.
///
/// The handler accepts the raw JSON so that legacy bodies wrapped in `incomingData` and
/// numeric field values are also handled. This type only describes the preferred form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateReportReq {
    /// One of `urgent-care`, `ward-admission`, `progress-note` (legacy values
    /// `urgencias`, `planta`, `evolutivo` are also accepted).
    #[schema(example = "urgent-care")]
    pub context: String,
    /// Raw form fields, e.g. `urg-age`, `urg-chief-complaint`.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateReportRes {
    pub report: String,
    pub recommendations: String,
    pub keywords: String,
}

impl From<ParsedResult> for GenerateReportRes {
    fn from(parsed: ParsedResult) -> Self {
        Self {
            report: parsed.report,
            recommendations: parsed.recommendations,
            keywords: parsed.keywords,
        }
    }
}

/// Structured error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    #[schema(example = "UPSTREAM_UNAVAILABLE")]
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_omits_empty_detail() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "BAD_REQUEST".into(),
                message: "bad".into(),
                detail: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"error": {"code": "BAD_REQUEST", "message": "bad"}})
        );
    }

    #[test]
    fn test_generate_request_flattens_fields() {
        let req: GenerateReportReq =
            serde_json::from_value(json!({"context": "urgent-care", "urg-age": "45"})).unwrap();
        assert_eq!(req.context, "urgent-care");
        assert_eq!(req.fields["urg-age"], "45");
    }
}
