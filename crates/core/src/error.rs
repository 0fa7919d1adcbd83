use crate::generation::{AttemptOutcome, GenerationAttempt};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unrecognised report context '{0}'")]
    UnknownContext(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("failed to read field alias file: {0}")]
    AliasFileRead(std::io::Error),
    #[error("failed to parse field alias file: {0}")]
    AliasFileParse(serde_yaml::Error),

    #[error(
        "generation failed after {} attempt(s): {}",
        .attempts.len(),
        describe_attempts(.attempts)
    )]
    UpstreamExhausted { attempts: Vec<GenerationAttempt> },
    #[error("model '{model}' returned no usable content: {reason}")]
    ContentRefused {
        model: String,
        reason: String,
        attempts: Vec<GenerationAttempt>,
    },
}

impl ReportError {
    /// True for errors the caller caused and can fix by changing the request.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ReportError::InvalidRequest(_) | ReportError::UnknownContext(_)
        )
    }

    /// Last HTTP status reported by the generation endpoint, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ReportError::UpstreamExhausted { attempts } => {
                attempts.iter().rev().find_map(|a| match &a.outcome {
                    AttemptOutcome::Failed(failure) => failure.status(),
                    AttemptOutcome::Succeeded { .. } => None,
                })
            }
            _ => None,
        }
    }
}

fn describe_attempts(attempts: &[GenerationAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{} ({})", a.model, a.outcome))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
