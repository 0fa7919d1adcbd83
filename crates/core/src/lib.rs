//! # Axiom Core
//!
//! Core business logic for clinical report generation.
//!
//! This crate contains the request pipeline and nothing else:
//! - context parsing and field normalisation (`context`, `fields`, `request`)
//! - prompt composition from static per-context templates (`prompt`)
//! - model invocation with a single ordered fallback (`generation`)
//! - delimiter-tolerant splitting of the model output (`segment`)
//! - startup configuration (`config`)
//!
//! **No API concerns**: HTTP routing, status codes and response bodies belong in `api-rest`
//! and `api-shared`.

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod fields;
pub mod generation;
pub mod prompt;
pub mod request;
pub mod segment;

use std::sync::Arc;

use tracing::Instrument;

pub use config::{CoreConfig, StartupConfig, UpstreamConfig};
pub use context::{PlaceholderLanguage, Placeholders, ReportContext};
pub use error::{ReportError, ReportResult};
pub use fields::{Field, FieldAliases, PatientFields};
pub use generation::{
    AttemptFailure, AttemptOutcome, Generation, GenerationAttempt, GenerationConfig,
    ModelBackend, ModelChain,
};
pub use prompt::{PromptComposer, PromptText};
pub use request::ReportRequest;
pub use segment::ParsedResult;

/// Report generation service.
///
/// Holds only immutable shared state, so clones are cheap and requests never contend.
#[derive(Clone)]
pub struct ReportService {
    config: Arc<CoreConfig>,
    backend: Arc<dyn ModelBackend>,
    composer: PromptComposer,
    placeholder_language: PlaceholderLanguage,
}

impl ReportService {
    /// Creates a new instance of ReportService.
    ///
    /// # Arguments
    /// * `config` - Startup configuration (models, sampling settings, language, aliases).
    /// * `backend` - Model backend used for every attempt.
    pub fn new(config: Arc<CoreConfig>, backend: Arc<dyn ModelBackend>) -> Self {
        let composer = PromptComposer::new(config.report_language());
        let placeholder_language =
            PlaceholderLanguage::for_report_language(config.report_language());
        Self {
            config,
            backend,
            composer,
            placeholder_language,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Normalise the request fields and compose the prompt. Never touches the network.
    pub fn compose(&self, request: &ReportRequest) -> (PatientFields, PromptText) {
        let fields =
            fields::normalize_fields(request.context, &request.fields, self.config.aliases());
        let prompt = self.composer.compose(request.context, &fields);
        (fields, prompt)
    }

    /// Run the full pipeline for a validated request.
    ///
    /// # Returns
    /// The segmented report. Segmentation itself never fails; every error comes from the
    /// generation step.
    ///
    /// # Errors
    /// Returns `ReportError::UpstreamExhausted`, `ReportError::ContentRefused` or
    /// `ReportError::Configuration` as produced by [`generation::generate_with_fallback`].
    pub async fn generate_report(&self, request: ReportRequest) -> ReportResult<ParsedResult> {
        let span = tracing::info_span!(
            "generate_report",
            request_id = %uuid::Uuid::new_v4(),
            context = %request.context,
        );

        async move {
            let (fields, prompt) = self.compose(&request);
            tracing::debug!(
                fields = fields.len(),
                prompt_chars = prompt.len(),
                "prompt composed"
            );

            let generation = generation::generate_with_fallback(
                self.backend.as_ref(),
                self.config.models(),
                &prompt,
                self.config.generation(),
            )
            .await?;

            let plan = fields.get(Field::Plan).map(|p| p.as_str());
            let placeholders = request.context.placeholders_in(self.placeholder_language);
            let parsed = segment::segment(&generation.text, placeholders, plan);
            tracing::info!(
                model = %generation.model,
                attempts = generation.attempts.len(),
                "report generated"
            );
            Ok(parsed)
        }
        .instrument(span)
        .await
    }

    /// Validate a raw JSON body and run the pipeline.
    ///
    /// An invalid body is rejected before any model is called.
    pub async fn generate_from_json(&self, body: serde_json::Value) -> ReportResult<ParsedResult> {
        let request = ReportRequest::from_json(body).inspect_err(|err| match err {
            ReportError::UnknownContext(context) => {
                tracing::warn!(context = %context, "request rejected: unknown context")
            }
            other => tracing::warn!("request rejected: {}", other),
        })?;
        self.generate_report(request).await
    }
}
