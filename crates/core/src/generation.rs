//! Model invocation with a single ordered fallback.
//!
//! The chain is tried strictly in order, one attempt per model:
//! - a transport failure (network, timeout, non-2xx, undecodable body) moves on to the next model
//! - a content failure (blocked, no candidates, blank text) ends the request immediately
//! - a configuration failure (bad credential) ends the request immediately
//!
//! Every attempt is recorded so the terminal error carries the full diagnostic trail.

use std::fmt;

use async_trait::async_trait;
use gemini::{GeminiClient, GeminiError};

pub use gemini::GenerationConfig;

use crate::constants::{DEFAULT_FALLBACK_MODEL, DEFAULT_PRIMARY_MODEL};
use crate::prompt::PromptText;
use crate::{ReportError, ReportResult};

/// Why a single model attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Network error, timeout, non-2xx status or undecodable body.
    Transport { status: Option<u16>, detail: String },
    /// The endpoint answered but produced nothing usable.
    Content { reason: String },
    /// The deployment is misconfigured; no other model will fare better.
    Configuration(String),
}

impl AttemptFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            AttemptFailure::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport {
                status: Some(status),
                detail,
            } => write!(f, "transport failure, status {status}: {detail}"),
            AttemptFailure::Transport { status: None, detail } => {
                write!(f, "transport failure: {detail}")
            }
            AttemptFailure::Content { reason } => write!(f, "content failure: {reason}"),
            AttemptFailure::Configuration(detail) => write!(f, "configuration failure: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded { chars: usize },
    Failed(AttemptFailure),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Succeeded { chars } => write!(f, "succeeded, {chars} chars"),
            AttemptOutcome::Failed(failure) => failure.fmt(f),
        }
    }
}

/// Record of one model attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationAttempt {
    pub model: String,
    pub outcome: AttemptOutcome,
}

impl GenerationAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Succeeded { .. })
    }
}

/// Successful generation: the raw text and how it was obtained.
#[derive(Debug, Clone)]
pub struct Generation {
    pub model: String,
    pub text: String,
    pub attempts: Vec<GenerationAttempt>,
}

/// Ordered list of models: the primary, then at most one fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChain {
    models: Vec<String>,
}

impl ModelChain {
    /// Build a chain from a primary model and an optional fallback.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Configuration` if a model identifier is blank. A fallback equal to
    /// the primary is dropped so the same model is never called twice.
    pub fn new(primary: impl Into<String>, fallback: Option<String>) -> ReportResult<Self> {
        let primary = primary.into().trim().to_string();
        if primary.is_empty() {
            return Err(ReportError::Configuration(
                "primary model identifier cannot be empty".into(),
            ));
        }

        let mut models = vec![primary];
        if let Some(fallback) = fallback {
            let fallback = fallback.trim().to_string();
            if fallback.is_empty() {
                return Err(ReportError::Configuration(
                    "fallback model identifier cannot be empty".into(),
                ));
            }
            if fallback != models[0] {
                models.push(fallback);
            }
        }

        Ok(Self { models })
    }

    pub fn primary(&self) -> &str {
        &self.models[0]
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

impl Default for ModelChain {
    fn default() -> Self {
        Self {
            models: vec![
                DEFAULT_PRIMARY_MODEL.to_string(),
                DEFAULT_FALLBACK_MODEL.to_string(),
            ],
        }
    }
}

/// Something that can turn a prompt into text using a named model.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        prompt: &PromptText,
        config: GenerationConfig,
    ) -> Result<String, AttemptFailure>;
}

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &PromptText,
        config: GenerationConfig,
    ) -> Result<String, AttemptFailure> {
        self.generate_content(model, prompt.as_str(), config)
            .await
            .map_err(attempt_failure_from_gemini)
    }
}

fn attempt_failure_from_gemini(err: GeminiError) -> AttemptFailure {
    if err.is_configuration() {
        return AttemptFailure::Configuration(err.to_string());
    }
    match err {
        GeminiError::NoContent { reason } => AttemptFailure::Content { reason },
        other => AttemptFailure::Transport {
            status: other.status(),
            detail: other.to_string(),
        },
    }
}

/// Run `prompt` through `chain`, falling back on transport failures only.
///
/// # Errors
///
/// - `ReportError::ContentRefused` as soon as any model returns unusable content
/// - `ReportError::Configuration` when the credential is rejected as malformed
/// - `ReportError::UpstreamExhausted` when every model failed at the transport level
pub async fn generate_with_fallback(
    backend: &dyn ModelBackend,
    chain: &ModelChain,
    prompt: &PromptText,
    config: GenerationConfig,
) -> ReportResult<Generation> {
    let mut attempts: Vec<GenerationAttempt> = Vec::with_capacity(chain.models().len());

    for model in chain.models() {
        let result = match backend.generate(model, prompt, config).await {
            Ok(text) if text.trim().is_empty() => Err(AttemptFailure::Content {
                reason: "empty completion".into(),
            }),
            other => other,
        };

        match result {
            Ok(text) => {
                let chars = text.chars().count();
                attempts.push(GenerationAttempt {
                    model: model.clone(),
                    outcome: AttemptOutcome::Succeeded { chars },
                });
                tracing::info!(
                    model = %model,
                    attempt = attempts.len(),
                    chars,
                    "generation succeeded"
                );
                return Ok(Generation {
                    model: model.clone(),
                    text,
                    attempts,
                });
            }
            Err(failure) => {
                tracing::warn!(
                    model = %model,
                    attempt = attempts.len() + 1,
                    status = ?failure.status(),
                    "generation attempt failed: {}",
                    failure
                );
                attempts.push(GenerationAttempt {
                    model: model.clone(),
                    outcome: AttemptOutcome::Failed(failure.clone()),
                });

                match failure {
                    AttemptFailure::Transport { .. } => continue,
                    AttemptFailure::Content { reason } => {
                        tracing::error!(model = %model, "generation refused: {}", reason);
                        return Err(ReportError::ContentRefused {
                            model: model.clone(),
                            reason,
                            attempts,
                        });
                    }
                    AttemptFailure::Configuration(detail) => {
                        tracing::error!(model = %model, "generation misconfigured: {}", detail);
                        return Err(ReportError::Configuration(detail));
                    }
                }
            }
        }
    }

    tracing::error!(attempts = attempts.len(), "all generation models failed");
    Err(ReportError::UpstreamExhausted { attempts })
}
