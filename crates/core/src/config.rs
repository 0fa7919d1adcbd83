//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services. Request
//! handling never reads process-wide environment variables.
//!
//! The `*_from_env_value` helpers take the raw `Option<String>` so they can be tested without
//! mutating the environment. [`StartupConfig::from_lookup`] ties them together for binaries.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gemini::GeminiClient;

use crate::constants::{
    DEFAULT_FALLBACK_MODEL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_PRIMARY_MODEL,
    DEFAULT_REPORT_LANGUAGE, DEFAULT_REST_ADDR, DEFAULT_TEMPERATURE,
    DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use crate::fields::FieldAliases;
use crate::generation::{GenerationConfig, ModelChain};
use crate::{ReportError, ReportResult};

pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_REST_ADDR: &str = "AXIOM_REST_ADDR";
pub const ENV_PRIMARY_MODEL: &str = "AXIOM_PRIMARY_MODEL";
pub const ENV_FALLBACK_MODEL: &str = "AXIOM_FALLBACK_MODEL";
pub const ENV_TEMPERATURE: &str = "AXIOM_TEMPERATURE";
pub const ENV_MAX_OUTPUT_TOKENS: &str = "AXIOM_MAX_OUTPUT_TOKENS";
pub const ENV_REPORT_LANGUAGE: &str = "AXIOM_REPORT_LANGUAGE";
pub const ENV_FIELD_ALIASES: &str = "AXIOM_FIELD_ALIASES";
pub const ENV_GEMINI_ENDPOINT: &str = "AXIOM_GEMINI_ENDPOINT";
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "AXIOM_UPSTREAM_TIMEOUT_SECS";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    models: ModelChain,
    generation: GenerationConfig,
    report_language: String,
    aliases: FieldAliases,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Configuration` if the report language is blank, the temperature
    /// is outside `0.0..=1.0`, or the output token bound is zero.
    pub fn new(
        models: ModelChain,
        generation: GenerationConfig,
        report_language: String,
        aliases: FieldAliases,
    ) -> ReportResult<Self> {
        let report_language = report_language.trim().to_string();
        if report_language.is_empty() {
            return Err(ReportError::Configuration(
                "report language cannot be empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&generation.temperature) {
            return Err(ReportError::Configuration(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                generation.temperature
            )));
        }
        if generation.max_output_tokens == 0 {
            return Err(ReportError::Configuration(
                "max output tokens must be greater than zero".into(),
            ));
        }

        Ok(Self {
            models,
            generation,
            report_language,
            aliases,
        })
    }

    pub fn models(&self) -> &ModelChain {
        &self.models
    }

    pub fn generation(&self) -> GenerationConfig {
        self.generation
    }

    pub fn report_language(&self) -> &str {
        &self.report_language
    }

    pub fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            models: ModelChain::default(),
            generation: GenerationConfig {
                temperature: DEFAULT_TEMPERATURE,
                max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            },
            report_language: DEFAULT_REPORT_LANGUAGE.to_string(),
            aliases: FieldAliases::default(),
        }
    }
}

/// Connection settings for the generation endpoint.
#[derive(Clone)]
pub struct UpstreamConfig {
    api_key: String,
    endpoint: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl UpstreamConfig {
    pub fn new(api_key: String, endpoint: Option<String>, timeout: Duration) -> Self {
        Self {
            api_key,
            endpoint,
            timeout,
        }
    }

    /// Build the HTTP client for the generation endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Configuration` if the key cannot be sent as a header, the endpoint
    /// is not a valid http(s) URL, or the client cannot be constructed.
    pub fn build_client(&self) -> ReportResult<Arc<GeminiClient>> {
        let endpoint = self.endpoint.as_deref().unwrap_or(gemini::DEFAULT_ENDPOINT);
        GeminiClient::with_endpoint(&self.api_key, endpoint, self.timeout)
            .map(Arc::new)
            .map_err(|e| ReportError::Configuration(e.to_string()))
    }
}

/// Everything a binary needs to start serving.
#[derive(Clone, Debug)]
pub struct StartupConfig {
    pub core: CoreConfig,
    pub upstream: UpstreamConfig,
    pub rest_addr: String,
}

impl StartupConfig {
    /// Resolve configuration through `lookup`, typically `|k| std::env::var(k).ok()`.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or missing value as a `ReportError`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ReportResult<Self> {
        let api_key = api_key_from_env_value(lookup(ENV_API_KEY))?;
        let models = ModelChain::new(
            model_from_env_value(lookup(ENV_PRIMARY_MODEL), DEFAULT_PRIMARY_MODEL),
            Some(model_from_env_value(
                lookup(ENV_FALLBACK_MODEL),
                DEFAULT_FALLBACK_MODEL,
            )),
        )?;
        let generation = GenerationConfig {
            temperature: temperature_from_env_value(lookup(ENV_TEMPERATURE))?,
            max_output_tokens: max_output_tokens_from_env_value(lookup(ENV_MAX_OUTPUT_TOKENS))?,
        };
        let report_language = non_empty(lookup(ENV_REPORT_LANGUAGE))
            .unwrap_or_else(|| DEFAULT_REPORT_LANGUAGE.to_string());
        let aliases = match field_aliases_path_from_env_value(lookup(ENV_FIELD_ALIASES)) {
            Some(path) => FieldAliases::from_yaml_file(&path)?,
            None => FieldAliases::default(),
        };

        let core = CoreConfig::new(models, generation, report_language, aliases)?;
        let upstream = UpstreamConfig::new(
            api_key,
            non_empty(lookup(ENV_GEMINI_ENDPOINT)),
            timeout_from_env_value(lookup(ENV_UPSTREAM_TIMEOUT_SECS))?,
        );
        let rest_addr =
            non_empty(lookup(ENV_REST_ADDR)).unwrap_or_else(|| DEFAULT_REST_ADDR.to_string());

        Ok(Self {
            core,
            upstream,
            rest_addr,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The generation credential is mandatory; absence aborts startup.
pub fn api_key_from_env_value(value: Option<String>) -> ReportResult<String> {
    non_empty(value)
        .ok_or_else(|| ReportError::Configuration(format!("{ENV_API_KEY} must be set")))
}

/// Model identifier, or `default` when unset or blank.
pub fn model_from_env_value(value: Option<String>, default: &str) -> String {
    non_empty(value).unwrap_or_else(|| default.to_string())
}

/// Parse the sampling temperature. Unset means the default.
pub fn temperature_from_env_value(value: Option<String>) -> ReportResult<f32> {
    let Some(value) = non_empty(value) else {
        return Ok(DEFAULT_TEMPERATURE);
    };
    let parsed: f32 = value.parse().map_err(|_| {
        ReportError::Configuration(format!("{ENV_TEMPERATURE} must be a number, got '{value}'"))
    })?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(ReportError::Configuration(format!(
            "{ENV_TEMPERATURE} must be between 0.0 and 1.0, got {parsed}"
        )));
    }
    Ok(parsed)
}

pub fn max_output_tokens_from_env_value(value: Option<String>) -> ReportResult<u32> {
    let Some(value) = non_empty(value) else {
        return Ok(DEFAULT_MAX_OUTPUT_TOKENS);
    };
    match value.parse::<u32>() {
        Ok(tokens) if tokens > 0 => Ok(tokens),
        _ => Err(ReportError::Configuration(format!(
            "{ENV_MAX_OUTPUT_TOKENS} must be a positive integer, got '{value}'"
        ))),
    }
}

pub fn timeout_from_env_value(value: Option<String>) -> ReportResult<Duration> {
    let Some(value) = non_empty(value) else {
        return Ok(Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS));
    };
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ReportError::Configuration(format!(
            "{ENV_UPSTREAM_TIMEOUT_SECS} must be a positive integer, got '{value}'"
        ))),
    }
}

/// Path of an alias override file, if one is configured.
pub fn field_aliases_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    non_empty(value).map(PathBuf::from)
}
