//! Score aggregation and ranking.
//!
//! This module turns scored messages into per-sender totals, selects the
//! top senders and resolves their display names from reference data.

use crate::models::{MessageRecord, Reference, SenderId, SenderScore};
use crate::scoring::excitement_score;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Default number of senders in the ranking.
pub const DEFAULT_TOP_N: usize = 3;

/// Score every message, yielding `(sender, score)` pairs in input order.
pub fn score_messages(messages: &[MessageRecord]) -> Vec<(SenderId, u64)> {
    messages
        .iter()
        .map(|m| (m.sender_id, excitement_score(m.text())))
        .collect()
}

/// Group by sender and sum scores.
pub fn sum_by_sender<I>(scores: I) -> HashMap<SenderId, u64>
where
    I: IntoIterator<Item = (SenderId, u64)>,
{
    let mut totals: HashMap<SenderId, u64> = HashMap::new();

    for (sender_id, score) in scores {
        *totals.entry(sender_id).or_default() += score;
    }

    totals
}

/// Get the top `n` senders, highest score first.
///
/// Equal scores are ordered by ascending sender id.
pub fn top_senders(totals: &HashMap<SenderId, u64>, n: usize) -> Vec<SenderScore> {
    let mut ranked: Vec<SenderScore> = totals
        .iter()
        .map(|(&sender_id, &score)| SenderScore::new(sender_id, score))
        .collect();

    ranked.sort_by_key(|s| (Reverse(s.peppy_score), s.sender_id));
    ranked.truncate(n);

    ranked
}

/// Find the display name of a user, or an empty string if unknown.
pub fn find_sender_name(sender_id: SenderId, references: &[Reference]) -> String {
    references
        .iter()
        .find(|r| r.is_user(sender_id))
        .and_then(|r| r.full_name.clone())
        .unwrap_or_default()
}

/// Return new scores with names filled in from `references`.
pub fn resolve_names(scores: &[SenderScore], references: &[Reference]) -> Vec<SenderScore> {
    scores
        .iter()
        .map(|s| s.with_name(find_sender_name(s.sender_id, references)))
        .collect()
}

/// Score, aggregate, rank and name in one pass over `messages`.
pub fn rank_senders(
    messages: &[MessageRecord],
    references: &[Reference],
    n: usize,
) -> Vec<SenderScore> {
    let totals = sum_by_sender(score_messages(messages));
    let top = top_senders(&totals, n);
    resolve_names(&top, references)
}
