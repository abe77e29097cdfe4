//! TOURNEYCAL — Sports Tournament Calendar Collector
//!
//! Entry point. Loads configuration, initialises structured logging,
//! and dispatches the CLI commands: database setup, the scraping run,
//! the per-level breakdown query, and JSON export.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::time::Duration;
use tracing::{info, warn};

use tourneycal::config::AppConfig;
use tourneycal::engine::pipeline::ScrapePipeline;
use tourneycal::fetch::PageFetcher;
use tourneycal::llm::openai::{ChatCompletionClient, ChatOptions};
use tourneycal::llm::TournamentExtractor;
use tourneycal::storage::TournamentStore;

#[derive(Parser)]
#[command(name = "tourneycal", version, about = "Sports tournament calendar collector")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database file, table, and indexes.
    Setup,
    /// Run the scraping pipeline over the configured sports.
    Scrape {
        /// Limit the run to a single sport.
        #[arg(long)]
        sport: Option<String>,
    },
    /// Print per-level tournament counts for a sport.
    Breakdown { sport: String },
    /// Export a sport's stored tournaments to a JSON file.
    Export {
        sport: String,
        #[arg(long, default_value = "tournaments.json")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let cfg = AppConfig::load(&cli.config)?;
    init_logging();

    match cli.command {
        Command::Setup => setup(&cfg).await,
        Command::Scrape { sport } => scrape(&cfg, sport.as_deref()).await,
        Command::Breakdown { sport } => breakdown(&cfg, &sport).await,
        Command::Export { sport, output } => export(&cfg, &sport, &output).await,
    }
}

/// Open the configured database, creating the data directory and the
/// schema if they do not exist yet.
async fn open_store(cfg: &AppConfig) -> Result<TournamentStore> {
    let path = std::path::Path::new(&cfg.storage.database_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }
    }

    let store = TournamentStore::open(&cfg.storage.database_path).await?;
    store.init_schema().await?;
    Ok(store)
}

async fn setup(cfg: &AppConfig) -> Result<()> {
    open_store(cfg).await?;
    info!(path = %cfg.storage.database_path, "Database created successfully");
    Ok(())
}

async fn scrape(cfg: &AppConfig, only_sport: Option<&str>) -> Result<()> {
    // A missing API key is fatal before any source is processed.
    let api_key = AppConfig::resolve_env(&cfg.llm.api_key_env)?;
    let extractor = build_extractor(cfg, SecretString::new(api_key))?;

    if !extractor.test_connection().await {
        bail!(
            "Extraction endpoint connectivity check failed (provider {}, model {})",
            cfg.llm.provider,
            cfg.llm.model
        );
    }
    info!(provider = %cfg.llm.provider, model = %cfg.llm.model, "Extraction endpoint reachable");

    let fetcher = PageFetcher::new(Duration::from_secs(cfg.scraper.request_timeout_secs))?;
    let store = open_store(cfg).await?;
    let pipeline = ScrapePipeline::new(fetcher, extractor, store, cfg.llm.fill_missing_summaries);

    let mut total_saved = 0usize;
    let mut total_failed_sources = 0usize;
    let mut matched = false;

    for sport in &cfg.sports {
        if let Some(only) = only_sport {
            if !sport.name.eq_ignore_ascii_case(only) {
                continue;
            }
        }
        matched = true;

        // A storage failure aborts the whole run; everything else has
        // already been degraded to per-source or per-record skips.
        let report = pipeline.run_sport(sport).await?;
        total_saved += report.saved;
        total_failed_sources += report.sources_failed;
    }

    if let Some(only) = only_sport {
        if !matched {
            bail!("No configured sport named {only}");
        }
    }

    info!(
        saved = total_saved,
        failed_sources = total_failed_sources,
        "Scrape run complete"
    );
    Ok(())
}

fn build_extractor(
    cfg: &AppConfig,
    api_key: SecretString,
) -> Result<Box<dyn TournamentExtractor>> {
    let mut options = match cfg.llm.provider.as_str() {
        "groq" => ChatOptions::groq(),
        "openai" => ChatOptions::openai(),
        other => {
            warn!(provider = other, "Unknown LLM provider, defaulting to Groq");
            ChatOptions::groq()
        }
    };

    options.model = cfg.llm.model.clone();
    options.max_tokens = cfg.llm.max_tokens;
    if let Some(temperature) = cfg.llm.temperature {
        options.temperature = temperature;
    }
    if let Some(endpoint) = &cfg.llm.endpoint {
        options.endpoint = endpoint.clone();
    }
    if let Some(interval_ms) = cfg.llm.min_request_interval_ms {
        options.min_request_interval = Duration::from_millis(interval_ms);
    }

    Ok(Box::new(ChatCompletionClient::new(api_key, options)?))
}

async fn breakdown(cfg: &AppConfig, sport: &str) -> Result<()> {
    let store = open_store(cfg).await?;
    let rows = store.breakdown_by_level(sport).await?;

    if rows.is_empty() {
        println!("No tournaments stored for {sport}.");
        return Ok(());
    }

    println!("{sport} tournaments by level:");
    for (level, count) in rows {
        println!("  {level}: {count}");
    }
    Ok(())
}

async fn export(cfg: &AppConfig, sport: &str, output: &str) -> Result<()> {
    let store = open_store(cfg).await?;
    let rows = store.list_by_sport(sport).await?;

    let json = serde_json::to_string_pretty(&rows)
        .context("Failed to serialise tournaments for export")?;
    std::fs::write(output, &json)
        .with_context(|| format!("Failed to write export to {output}"))?;

    info!(output, count = rows.len(), "Export written");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tourneycal=info"));

    let json_logging = std::env::var("TOURNEYCAL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
