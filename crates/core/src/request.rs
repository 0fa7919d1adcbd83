//! Inbound report requests.
//!
//! Two body shapes are accepted:
//! - flat: `{"context": "urgent-care", "urg-age": "45", ...}`
//! - legacy envelope: `{"incomingData": {"contexto": "urgencias", "urg-edad": "45", ...}}`
//!
//! Field values must be strings. Numbers are stringified, `null` is treated as absent and any
//! other JSON type is rejected.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::context::ReportContext;
use crate::{ReportError, ReportResult};

const ENVELOPE_KEY: &str = "incomingData";
const CONTEXT_KEYS: [&str; 2] = ["context", "contexto"];

/// A validated request: a known context plus raw, not yet normalised, form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub context: ReportContext,
    pub fields: BTreeMap<String, String>,
}

impl ReportRequest {
    /// Validate a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidRequest` if the body is not an object, the context is
    /// missing or not a string, or a field value has an unsupported type. Returns
    /// `ReportError::UnknownContext` if the context value is not recognised.
    pub fn from_json(body: Value) -> ReportResult<Self> {
        let Value::Object(mut object) = body else {
            return Err(ReportError::InvalidRequest(
                "request body must be a JSON object".into(),
            ));
        };

        if let Some(envelope) = object.remove(ENVELOPE_KEY) {
            let Value::Object(inner) = envelope else {
                return Err(ReportError::InvalidRequest(format!(
                    "'{ENVELOPE_KEY}' must be a JSON object"
                )));
            };
            object = inner;
        }

        let context = take_context(&mut object)?;
        let mut fields = BTreeMap::new();
        for (key, value) in object {
            if let Some(value) = field_value(&key, value)? {
                fields.insert(key, value);
            }
        }

        Ok(Self { context, fields })
    }
}

fn take_context(object: &mut Map<String, Value>) -> ReportResult<ReportContext> {
    let value = CONTEXT_KEYS
        .iter()
        .find_map(|key| object.remove(*key))
        .ok_or_else(|| ReportError::InvalidRequest("'context' is required".into()))?;

    match value {
        Value::String(context) => context.parse(),
        Value::Null => Err(ReportError::InvalidRequest("'context' is required".into())),
        _ => Err(ReportError::InvalidRequest(
            "'context' must be a string".into(),
        )),
    }
}

fn field_value(key: &str, value: Value) -> ReportResult<Option<String>> {
    match value {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Null => Ok(None),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(ReportError::InvalidRequest(
            format!("field '{key}' must be a string or number"),
        )),
    }
}
