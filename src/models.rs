//! Data models for the ranking run.
//!
//! This module contains the message and reference records read from a
//! Yammer topic feed, and the per-sender score written to the ranking file.

use crate::errors::FormatError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Numeric Yammer user identifier.
pub type SenderId = u64;

/// Reference type tag for user directory entries.
pub const USER_REFERENCE_TYPE: &str = "user";

/// Body of a message. Only the plain-text rendition is scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub plain: String,
}

/// A single message from the topic feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Identifier of the user who posted the message.
    pub sender_id: SenderId,
    /// Message body; missing or null bodies score as empty text.
    #[serde(default, deserialize_with = "lenient_body")]
    pub body: MessageBody,
}

impl MessageRecord {
    /// Creates a message with the given plain-text body.
    pub fn new(sender_id: SenderId, plain: impl Into<String>) -> Self {
        Self {
            sender_id,
            body: MessageBody {
                plain: plain.into(),
            },
        }
    }

    /// The text that gets scored.
    pub fn text(&self) -> &str {
        &self.body.plain
    }
}

/// Auxiliary metadata entry shipped alongside the messages.
///
/// Only `user` entries are used, to resolve a sender id to a display name.
/// Other entry types (topics, threads, groups) are tolerated with whatever
/// fields they happen to carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<SenderId>,
    #[serde(default, deserialize_with = "lenient_name")]
    pub full_name: Option<String>,
}

impl Reference {
    /// Creates a user directory entry.
    #[cfg(test)]
    pub fn user(id: SenderId, full_name: &str) -> Self {
        Self {
            kind: USER_REFERENCE_TYPE.to_string(),
            id: Some(id),
            full_name: Some(full_name.to_string()),
        }
    }

    /// Returns true if this entry describes the given user.
    pub fn is_user(&self, sender_id: SenderId) -> bool {
        self.kind == USER_REFERENCE_TYPE && self.id == Some(sender_id)
    }
}

/// Total excitement score of one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderScore {
    pub sender_id: SenderId,
    pub peppy_score: u64,
    #[serde(default)]
    pub sender_name: String,
}

impl SenderScore {
    /// Creates a score that has not been resolved to a name yet.
    pub fn new(sender_id: SenderId, peppy_score: u64) -> Self {
        Self {
            sender_id,
            peppy_score,
            sender_name: String::new(),
        }
    }

    /// Returns a copy of this score carrying the given display name.
    pub fn with_name(&self, sender_name: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            ..self.clone()
        }
    }
}

/// A parsed "messages about topic" document.
#[derive(Debug, Clone)]
pub struct TopicFeed {
    /// The `messages` array exactly as received, for the audit file.
    pub raw_messages: Value,
    pub references: Vec<Reference>,
    pub messages: Vec<MessageRecord>,
}

impl TopicFeed {
    /// Parse a raw JSON document holding `references` and `messages`.
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let mut root: Value = serde_json::from_str(raw)?;

        let references = take_array(&mut root, "references")?;
        let raw_messages = take_array(&mut root, "messages")?;

        let references: Vec<Reference> = serde_json::from_value(references)?;

        let messages = raw_messages
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        MessageRecord::deserialize(entry).map_err(|e| {
                            FormatError::InvalidMessage {
                                index,
                                reason: e.to_string(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            raw_messages,
            references,
            messages,
        })
    }
}

/// Non-numeric ids (some reference types use string ids) never match a sender.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<SenderId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_u64())
}

/// Null or non-string values read as empty text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_name(deserializer)?.unwrap_or_default())
}

fn lenient_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_str().map(String::from))
}

/// Anything other than an object is treated as an empty body.
fn lenient_body<'de, D>(deserializer: D) -> Result<MessageBody, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => {
            MessageBody::deserialize(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(MessageBody::default()),
    }
}

fn take_array(root: &mut Value, field: &'static str) -> Result<Value, FormatError> {
    match root.get_mut(field).map(Value::take) {
        Some(value @ Value::Array(_)) => Ok(value),
        _ => Err(FormatError::MissingField(field)),
    }
}
