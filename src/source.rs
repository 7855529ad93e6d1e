//! Where topic documents come from.
//!
//! The ranking pipeline only ever asks for "the raw messages-about-topic
//! JSON". How that document is obtained (OAuth against Yammer, or a file
//! saved from an earlier run) stays behind [`MessageSource`].

use crate::errors::FetchError;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Capability to fetch the raw JSON document of messages about a topic.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Human-readable description used in progress output.
    fn describe(&self) -> String;

    /// Fetch the document holding top-level `references` and `messages`.
    async fn fetch_messages_about_topic(&self) -> Result<String, FetchError>;
}

/// Reads a topic document saved on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MessageSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch_messages_about_topic(&self) -> Result<String, FetchError> {
        debug!("Reading topic document from {}", self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.display().to_string(),
                source,
            })
    }
}
