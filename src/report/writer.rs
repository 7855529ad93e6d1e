//! Output files and the console summary.
//!
//! Two files are produced per run: the raw `messages` array for auditing,
//! and the ranking of the most excited senders.

use crate::errors::{PeppyError, Result};
use crate::models::SenderScore;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Serialize the `messages` array compactly, as received.
pub fn generate_messages_json(raw_messages: &Value) -> Result<String> {
    serde_json::to_string(raw_messages).map_err(Into::into)
}

/// Generate the ranking JSON array.
pub fn generate_ranking_json(ranking: &[SenderScore], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(ranking)?
    } else {
        serde_json::to_string(ranking)?
    };
    Ok(json)
}

/// Write `content` to `path`, replacing any existing file.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    let to_error = |source| PeppyError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut file = std::fs::File::create(path).map_err(to_error)?;
    file.write_all(content.as_bytes()).map_err(to_error)?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Human-readable ranking for the console.
pub fn generate_summary_text(ranking: &[SenderScore]) -> String {
    if ranking.is_empty() {
        return "No messages to rank.".to_string();
    }

    ranking
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let name = if s.sender_name.is_empty() {
                "(unknown)"
            } else {
                s.sender_name.as_str()
            };
            format!(
                "{}. {} (id {}) - score {}",
                i + 1,
                name,
                s.sender_id,
                s.peppy_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
