//! PeppyRank - Yammer excitement ranking
//!
//! A CLI tool that fetches the messages about a Yammer topic, scores how
//! excited each message sounds and writes the top senders as JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Configuration, fetch, format or write error

mod analysis;
mod cli;
mod config;
mod errors;
mod models;
mod pipeline;
mod report;
mod scoring;
mod source;
mod yammer;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use source::{FileSource, MessageSource};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;
use yammer::YammerClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("PeppyRank v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_ranking(&args).await {
        error!("Ranking failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .peppyrank.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml().context("Failed to generate default configuration")?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with placeholder settings.", DEFAULT_CONFIG_FILE);
    println!("   Fill in your Yammer topic, OAuth client and account credentials.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must exist; the default file is optional.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Ok(Config::load(config_path)?);
    }

    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults and CLI flags");
            Ok(Config::default())
        }
    }
}

/// Pick where the topic document comes from. Credentials are validated here,
/// before any network I/O.
fn build_source(args: &Args, config: &Config) -> Result<Box<dyn MessageSource>> {
    if let Some(ref input) = args.input {
        info!("Using local topic document: {}", input.display());
        return Ok(Box::new(FileSource::new(input)));
    }

    let settings = config.yammer_settings()?;
    debug!("Yammer settings: {:?}", settings);
    let client = YammerClient::new(settings).context("Failed to create HTTP client")?;
    Ok(Box::new(client))
}

fn fetch_spinner(args: &Args, source: &dyn MessageSource) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Ranking messages from {}...", source.describe()));
    spinner.enable_steady_tick(Duration::from_millis(120));
    Some(spinner)
}

/// Run the complete ranking workflow.
async fn run_ranking(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Load and validate configuration up front
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let output = config.output_settings()?;
    let top_n = config.top_n()?;
    let source = build_source(args, &config)?;

    let spinner = fetch_spinner(args, source.as_ref());
    let result = pipeline::run(source.as_ref(), &output, top_n).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let outcome = result?;

    if !args.quiet {
        println!("\n🎉 Top {} most excited senders:", top_n);
        println!("{}", report::generate_summary_text(&outcome.ranking));
        println!("\n   Messages analyzed: {}", outcome.message_count);
        println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
        println!(
            "\n✅ Ranking saved to: {} (raw messages: {})",
            output.ranking_path.display(),
            output.messages_path.display()
        );
    }

    Ok(())
}
