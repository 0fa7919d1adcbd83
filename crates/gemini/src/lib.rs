//! Generative Language wire/boundary support.
//!
//! This crate owns everything that knows the shape of the external text-generation endpoint:
//! - request and response **wire models** (`wire`)
//! - a thin HTTP client issuing exactly one `generateContent` call per invocation (`client`)
//!
//! It knows nothing about clinical contexts, prompts or model fallback. Those
//! belong in `axiom-core`, which drives this client once per attempt.

pub mod client;
pub mod wire;

pub use client::{GeminiClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use wire::{GenerateContentResponse, GenerationConfig};

/// Errors returned by the `gemini` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("API key is required")]
    MissingApiKey,

    #[error("invalid API key header: {0}")]
    InvalidApiKey(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("failed to create HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("upstream returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("response contained no usable text: {reason}")]
    NoContent { reason: String },
}

impl GeminiError {
    /// HTTP status reported by the upstream, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            GeminiError::Status { status, .. } => Some(*status),
            GeminiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for errors caused by local configuration rather than the upstream.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GeminiError::MissingApiKey
                | GeminiError::InvalidApiKey(_)
                | GeminiError::InvalidEndpoint(_)
                | GeminiError::ClientBuild(_)
        )
    }
}

/// Type alias for Results that can fail with a [`GeminiError`].
pub type GeminiResult<T> = Result<T, GeminiError>;
