use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use feed_digest::api::{self, AppState};
use feed_digest::briefing::OpenAiSummarizer;
use feed_digest::digest::SmtpSink;
use feed_digest::extract::HttpTextExtractor;
use feed_digest::{Aggregator, DigestConfig, EmailSink, FeedFetcher, PgArticleStore, Pipeline};

#[derive(Parser)]
#[command(name = "feed-digest", about = "RSS aggregation and AI-briefing digest pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute one digest run and print the run log.
    Run,
    /// Serve the HTTP trigger endpoint for a scheduler.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = DigestConfig::from_env().context("loading configuration")?;
    let pipeline = Arc::new(build_pipeline(&config).await.context("building pipeline")?);

    match cli.command {
        Command::Run => {
            let report = pipeline.run().await;
            for line in &report.log {
                println!("{line}");
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                std::process::exit(1);
            }
        }
        Command::Serve => {
            let state = AppState::new(pipeline, config.cron_secret.clone());
            let app = api::router(state);
            let listener = tokio::net::TcpListener::bind(&config.bind_addr)
                .await
                .with_context(|| format!("binding {}", config.bind_addr))?;
            info!("Listening on {}", config.bind_addr);
            axum::serve(listener, app).await.context("serving HTTP")?;
        }
    }

    Ok(())
}

async fn build_pipeline(config: &DigestConfig) -> anyhow::Result<Pipeline> {
    let fetcher = Arc::new(FeedFetcher::new(&config.settings)?);
    let aggregator = Aggregator::from_registry(fetcher.clone(), &config.settings);
    let store = Arc::new(PgArticleStore::connect(&config.database_url).await?);
    let extractor = Arc::new(HttpTextExtractor::new(fetcher));
    let summarizer = Arc::new(OpenAiSummarizer::from_config(config)?);

    let email: Option<Arc<dyn EmailSink>> = if config.recipient_email.is_some() {
        match SmtpSink::from_config(config) {
            Ok(sink) => Some(Arc::new(sink)),
            Err(e) => {
                warn!("Email disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    Ok(Pipeline::new(
        aggregator,
        store,
        extractor,
        summarizer,
        email,
        config.recipient_email.clone(),
        config.settings.clone(),
    ))
}
