use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use api_shared::GenerateReportRes;
use axiom_core::{
    fields::normalize_fields, segment::segment, CoreConfig, FieldAliases, PlaceholderLanguage,
    PromptComposer, ReportContext, ReportRequest, ReportService, StartupConfig,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "axiom")]
#[command(about = "Axiom clinical report generation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the prompt composed for a request file (no network)
    Prompt {
        /// JSON request body, as sent to POST /api/generate
        input: PathBuf,
        /// Output language instruction
        #[arg(long, default_value = axiom_core::constants::DEFAULT_REPORT_LANGUAGE)]
        language: String,
        /// YAML file overriding the field alias table
        #[arg(long)]
        aliases: Option<PathBuf>,
    },
    /// Split raw model output into report, recommendations and keywords
    Segment {
        /// Text file holding the raw model output
        input: PathBuf,
        /// Report context used for placeholder wording
        #[arg(long, default_value = "urgent-care")]
        context: String,
        /// Plan text used when the output has no separator
        #[arg(long)]
        plan: Option<String>,
        /// Report language, selects the placeholder wording
        #[arg(long, default_value = axiom_core::constants::DEFAULT_REPORT_LANGUAGE)]
        language: String,
    },
    /// Run the full pipeline using the environment configuration
    Generate {
        /// JSON request body, as sent to POST /api/generate
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Prompt {
            input,
            language,
            aliases,
        } => {
            let request = read_request(&input)?;
            let table = match aliases {
                Some(path) => FieldAliases::from_yaml_file(&path)?,
                None => FieldAliases::default(),
            };
            let fields = normalize_fields(request.context, &request.fields, &table);
            let prompt = PromptComposer::new(language).compose(request.context, &fields);
            println!("{prompt}");
        }
        Commands::Segment {
            input,
            context,
            plan,
            language,
        } => {
            let context: ReportContext = context.parse()?;
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let placeholders =
                context.placeholders_in(PlaceholderLanguage::for_report_language(&language));
            let parsed = segment(&raw, placeholders, plan.as_deref());
            print_json(&GenerateReportRes::from(parsed))?;
        }
        Commands::Generate { input } => {
            dotenvy::dotenv().ok();
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive("axiom=info".parse()?),
                )
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();

            let request = read_request(&input)?;
            let startup = StartupConfig::from_lookup(|key| std::env::var(key).ok())?;
            let backend = startup.upstream.build_client()?;
            let config: Arc<CoreConfig> = Arc::new(startup.core);
            let service = ReportService::new(config, backend);

            let parsed = service.generate_report(request).await?;
            print_json(&GenerateReportRes::from(parsed))?;
        }
    }

    Ok(())
}

fn read_request(path: &Path) -> anyhow::Result<ReportRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let body: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(ReportRequest::from_json(body)?)
}

fn print_json(res: &GenerateReportRes) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(res)?);
    Ok(())
}
