use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use review_pulse::config::{AppTarget, PipelineConfig};
use review_pulse::pipeline::classify::KeywordClassifier;
use review_pulse::sender::SmtpSender;
use review_pulse::source::{ItunesRssSource, JsonFileSource, ReviewSource};
use review_pulse::store::FsArtifactStore;
use review_pulse::workflow::{ActionReport, Pipeline};

/// Review Pulse CLI.
#[derive(Parser)]
#[command(
    name = "review-pulse",
    about = "App review ingestion, theming, and weekly reporting",
    version
)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// One subcommand per pipeline action.
#[derive(Subcommand)]
enum Commands {
    /// Fetch, normalize and filter reviews into the filtered artifact.
    Scrape {
        /// App to scrape: a store URL, a Play package name, or an App Store
        /// numeric id. Defaults to the configured app.
        target: Option<String>,

        /// Read raw reviews from a JSON file instead of the iTunes RSS feed.
        /// Required for Google Play targets.
        #[arg(long)]
        from_file: Option<PathBuf>,
    },

    /// Tag every filtered review with a theme.
    Categorize,

    /// Rank themes and render the weekly report.
    Report,

    /// Compose the outbound email draft.
    Draft,

    /// Send the persisted draft.
    Send {
        /// Recipient email address.
        recipient: String,
    },

    /// Run the whole pipeline in order, stopping at the first failure.
    Run {
        /// App to scrape. Defaults to the configured app.
        target: Option<String>,

        /// Read raw reviews from a JSON file instead of the iTunes RSS feed.
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// Send the draft to this address after composing it.
        #[arg(long)]
        recipient: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let mut config = PipelineConfig::from_env();

    // Retarget before building the store so artifact names follow the app.
    if let Commands::Scrape {
        target: Some(input),
        ..
    }
    | Commands::Run {
        target: Some(input),
        ..
    } = &cli.command
    {
        let target = AppTarget::parse(input)?;
        config = config.with_target(&target);
    }

    let from_file = match &cli.command {
        Commands::Scrape { from_file, .. } | Commands::Run { from_file, .. } => from_file.clone(),
        _ => None,
    };
    let source: Arc<dyn ReviewSource> = match from_file {
        Some(path) => Arc::new(JsonFileSource::new(path)),
        None => Arc::new(ItunesRssSource::new(config.country.clone())),
    };

    let store = Arc::new(FsArtifactStore::new(
        config.base_dir.clone(),
        config.app_slug(),
    ));
    let classifier = Arc::new(KeywordClassifier::default_rules());
    let sender = Arc::new(SmtpSender::from_env());

    let target_input = config.app_id.clone();
    let pipeline = Pipeline::new(config, source, classifier, store, sender);

    let ok = match cli.command {
        Commands::Scrape { .. } => print_report(&pipeline.scrape_reviews(&target_input).await)?,
        Commands::Categorize => print_report(&pipeline.categorize_reviews().await)?,
        Commands::Report => print_report(&pipeline.generate_weekly_note().await)?,
        Commands::Draft => print_report(&pipeline.create_email_draft().await)?,
        Commands::Send { recipient } => print_report(&pipeline.send_email(&recipient).await)?,
        Commands::Run { recipient, .. } => {
            run_chain(&pipeline, &target_input, recipient.as_deref()).await?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Print one action report as JSON; returns whether the action succeeded.
fn print_report(report: &ActionReport) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(report.is_success())
}

/// Run every stage in order, stopping at the first failure.
async fn run_chain(
    pipeline: &Pipeline,
    target: &str,
    recipient: Option<&str>,
) -> anyhow::Result<bool> {
    if !print_report(&pipeline.scrape_reviews(target).await)? {
        return Ok(false);
    }
    if !print_report(&pipeline.categorize_reviews().await)? {
        return Ok(false);
    }
    if !print_report(&pipeline.generate_weekly_note().await)? {
        return Ok(false);
    }
    if !print_report(&pipeline.create_email_draft().await)? {
        return Ok(false);
    }
    if let Some(to) = recipient {
        return print_report(&pipeline.send_email(to).await);
    }
    Ok(true)
}
