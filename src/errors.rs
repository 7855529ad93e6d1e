//! Error taxonomy.
//!
//! Every failure is unrecoverable at the point it is detected and is
//! propagated to `main`, which terminates the run. Name resolution misses
//! are not errors and never show up here.

use thiserror::Error;

/// Missing or invalid configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing required configuration key: {0}")]
    MissingKey(&'static str),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Authentication or HTTP failure while talking to Yammer.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{what} failed. Http status code: {status}")]
    Status {
        what: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Login form is not found")]
    LoginFormNotFound,

    #[error("Authorization code was not returned by the OAuth dialog")]
    AuthorizationCodeMissing,

    #[error("Access token is missing from the token response")]
    AccessTokenMissing,

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to read input file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The fetched document does not have the expected shape.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Unexpected JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unexpected JSON format: missing top-level field `{0}`")]
    MissingField(&'static str),

    #[error("Unexpected JSON format: message #{index} is invalid: {reason}")]
    InvalidMessage { index: usize, reason: String },
}

/// Top-level error for a ranking run.
#[derive(Error, Debug)]
pub enum PeppyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PeppyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_message() {
        let err = PeppyError::from(ConfigError::MissingKey("yammer.topic_id"));
        assert_eq!(
            err.to_string(),
            "Missing required configuration key: yammer.topic_id"
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = PeppyError::from(FormatError::MissingField("references"));
        assert!(err.to_string().contains("`references`"));
    }
}
