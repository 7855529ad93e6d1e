//! Configuration file handling.
//!
//! This module handles loading `.peppyrank.toml`, merging CLI overrides
//! and validating that every key a run needs is present.

use crate::analysis::DEFAULT_TOP_N;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".peppyrank.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output file settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Ranking settings.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Yammer account and topic settings.
    #[serde(default)]
    pub yammer: YammerConfig,
}

/// Where results are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File receiving the raw `messages` array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages_path: Option<PathBuf>,

    /// File receiving the top-sender ranking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_path: Option<PathBuf>,

    /// Pretty-print the ranking JSON.
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Number of senders kept in the ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Yammer settings. Everything but the endpoint and timeout is required
/// when fetching from the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YammerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Base URL of the Yammer web site and API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for YammerConfig {
    fn default() -> Self {
        Self {
            topic_id: None,
            client_id: None,
            client_secret: None,
            email: None,
            password: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.yammer.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Validated output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub messages_path: PathBuf,
    pub ranking_path: PathBuf,
    pub pretty: bool,
}

/// OAuth client and account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub email: String,
    pub password: String,
}

// Secrets stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated Yammer settings.
#[derive(Debug, Clone)]
pub struct YammerSettings {
    pub base_url: String,
    pub topic_id: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

fn required<T: Clone>(value: &Option<T>, key: &'static str) -> Result<T, ConfigError>
where
    T: AsRef<std::ffi::OsStr>,
{
    match value {
        Some(v) if !v.as_ref().is_empty() => Ok(v.clone()),
        _ => Err(ConfigError::MissingKey(key)),
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref path) = args.messages_out {
            self.output.messages_path = Some(path.clone());
        }
        if let Some(ref path) = args.ranking_out {
            self.output.ranking_path = Some(path.clone());
        }
        if args.pretty {
            self.output.pretty = true;
        }

        if let Some(top) = args.top {
            self.ranking.top_n = top;
        }

        if let Some(ref topic) = args.topic {
            self.yammer.topic_id = Some(topic.clone());
        }
        if let Some(ref secret) = args.client_secret {
            self.yammer.client_secret = Some(secret.clone());
        }
        if let Some(ref password) = args.password {
            self.yammer.password = Some(password.clone());
        }
    }

    /// Validate and return the output settings.
    pub fn output_settings(&self) -> Result<OutputSettings, ConfigError> {
        Ok(OutputSettings {
            messages_path: required(&self.output.messages_path, "output.messages_path")?,
            ranking_path: required(&self.output.ranking_path, "output.ranking_path")?,
            pretty: self.output.pretty,
        })
    }

    /// Validate and return the ranking size.
    pub fn top_n(&self) -> Result<usize, ConfigError> {
        if self.ranking.top_n == 0 {
            return Err(ConfigError::Invalid {
                key: "ranking.top_n",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(self.ranking.top_n)
    }

    /// Validate and return the Yammer settings.
    pub fn yammer_settings(&self) -> Result<YammerSettings, ConfigError> {
        let yammer = &self.yammer;

        let credentials = Credentials {
            client_id: required(&yammer.client_id, "yammer.client_id")?,
            client_secret: required(&yammer.client_secret, "yammer.client_secret")?,
            email: required(&yammer.email, "yammer.email")?,
            password: required(&yammer.password, "yammer.password")?,
        };
        let topic_id = required(&yammer.topic_id, "yammer.topic_id")?;

        if !yammer.base_url.starts_with("http://") && !yammer.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "yammer.base_url",
                reason: "must start with 'http://' or 'https://'".to_string(),
            });
        }
        if yammer.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "yammer.timeout_seconds",
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(YammerSettings {
            base_url: yammer.base_url.trim_end_matches('/').to_string(),
            topic_id,
            credentials,
            timeout: Duration::from_secs(yammer.timeout_seconds),
        })
    }

    /// Generate a template configuration file with placeholder values.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        let config = Config {
            output: OutputConfig {
                messages_path: Some(PathBuf::from("messages.json")),
                ranking_path: Some(PathBuf::from("ranking.json")),
                pretty: false,
            },
            ranking: RankingConfig::default(),
            yammer: YammerConfig {
                topic_id: Some("<topic id>".to_string()),
                client_id: Some("<client id>".to_string()),
                client_secret: Some("<client secret>".to_string()),
                email: Some("<login email>".to_string()),
                password: Some("<login password>".to_string()),
                ..YammerConfig::default()
            },
        };
        toml::to_string_pretty(&config)
    }
}
