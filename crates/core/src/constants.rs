//! Constants used throughout the Axiom core crate.
//!
//! Delimiter tokens, default model identifiers and generation defaults live here so the prompt
//! composer, the segmenter and startup configuration agree on a single value.

/// Separator the model must emit between the report and the recommendations.
pub const PRIMARY_SEPARATOR: &str = "---SEPARADOR---";

/// Separator the model must emit between the recommendations and the keywords.
pub const SECONDARY_SEPARATOR: &str = "---KEYWORDS---";

/// Model tried first for every request.
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-1.5-flash-latest";

/// Model tried once when the primary attempt fails at the transport level.
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-pro";

/// Low temperature keeps clinical phrasing conservative and repeatable.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Language the generated report is written in.
pub const DEFAULT_REPORT_LANGUAGE: &str = "Spanish";

/// Per-attempt timeout for outbound generation calls, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Default listen address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
