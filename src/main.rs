use std::sync::Arc;

use api_rest::{AppState, router};
use axiom_core::{ReportService, StartupConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Axiom report service
///
/// Resolves configuration once from the environment (after loading `.env`), builds the
/// generation client and serves the REST API until interrupted.
///
/// # Environment Variables
/// - `GOOGLE_API_KEY`: generation credential (required)
/// - `AXIOM_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `AXIOM_PRIMARY_MODEL` / `AXIOM_FALLBACK_MODEL`: model chain
/// - `AXIOM_TEMPERATURE`, `AXIOM_MAX_OUTPUT_TOKENS`: sampling settings
/// - `AXIOM_REPORT_LANGUAGE`: language of the generated report (default: "Spanish")
/// - `AXIOM_FIELD_ALIASES`: YAML file overriding the field alias table
/// - `AXIOM_GEMINI_ENDPOINT`, `AXIOM_UPSTREAM_TIMEOUT_SECS`: upstream connection
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any configuration value is missing or invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("axiom=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let startup = StartupConfig::from_lookup(|key| std::env::var(key).ok())?;
    let backend = startup.upstream.build_client()?;

    tracing::info!(
        primary = startup.core.models().primary(),
        models = startup.core.models().models().len(),
        endpoint = backend.endpoint(),
        "++ Generation client ready"
    );

    let service = ReportService::new(Arc::new(startup.core), backend);
    let app = router(AppState::new(service));

    tracing::info!("++ Starting Axiom REST on {}", startup.rest_addr);
    let listener = tokio::net::TcpListener::bind(&startup.rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("-- Shutting down Axiom REST");
            }
        })
        .await?;

    Ok(())
}
