//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// PeppyRank - who is the most excited person in your Yammer topic?
///
/// Fetches the messages about a Yammer topic, scores each one by its
/// exclamation marks, elongated vowels and repeated characters, and
/// writes the top senders to a JSON ranking.
///
/// Examples:
///   peppyrank
///   peppyrank --config team.toml --top 5 --pretty
///   peppyrank --input saved_topic.json --ranking-out ranking.json
///   peppyrank --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .peppyrank.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Read the topic document from a local JSON file instead of Yammer
    ///
    /// Yammer credentials are not required in this mode.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Yammer topic id (overrides yammer.topic_id)
    #[arg(long, value_name = "ID")]
    pub topic: Option<String>,

    /// OAuth client secret (overrides yammer.client_secret)
    #[arg(long, env = "YAMMER_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Account password (overrides yammer.password)
    #[arg(long, env = "YAMMER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// File for the raw messages JSON (overrides output.messages_path)
    #[arg(long, value_name = "FILE")]
    pub messages_out: Option<PathBuf>,

    /// File for the ranking JSON (overrides output.ranking_path)
    #[arg(short, long, value_name = "FILE")]
    pub ranking_out: Option<PathBuf>,

    /// Number of senders in the ranking (default: 3)
    #[arg(short, long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Pretty-print the ranking JSON
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .peppyrank.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("Top must be at least 1".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
