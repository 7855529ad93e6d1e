//! Fetch, rank and write.
//!
//! Strictly sequential: the document is fetched, the raw messages are
//! written for auditing, senders are scored and ranked, and the ranking is
//! written. Any failure aborts the run; there is no partial output mode
//! beyond whatever file was already written.

use crate::analysis::rank_senders;
use crate::config::OutputSettings;
use crate::errors::Result;
use crate::models::{SenderScore, TopicFeed};
use crate::report;
use crate::source::MessageSource;
use tracing::{debug, info};

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RankingOutcome {
    pub message_count: usize,
    pub ranking: Vec<SenderScore>,
}

/// Rank the senders of an already fetched feed.
pub fn rank_feed(feed: &TopicFeed, top_n: usize) -> Vec<SenderScore> {
    rank_senders(&feed.messages, &feed.references, top_n)
}

/// Run the whole pipeline against `source`.
pub async fn run<S>(source: &S, output: &OutputSettings, top_n: usize) -> Result<RankingOutcome>
where
    S: MessageSource + ?Sized,
{
    info!("Fetching messages from {}", source.describe());
    let raw = source.fetch_messages_about_topic().await?;

    let feed = TopicFeed::parse(&raw)?;
    info!(
        "Fetched {} messages and {} references",
        feed.messages.len(),
        feed.references.len()
    );

    let messages_json = report::generate_messages_json(&feed.raw_messages)?;
    report::write_output(&output.messages_path, &messages_json)?;
    info!("Raw messages written to {}", output.messages_path.display());

    let ranking = rank_feed(&feed, top_n);
    debug!("Ranking: {:?}", ranking);

    let ranking_json = report::generate_ranking_json(&ranking, output.pretty)?;
    report::write_output(&output.ranking_path, &ranking_json)?;
    info!("Ranking written to {}", output.ranking_path.display());

    Ok(RankingOutcome {
        message_count: feed.messages.len(),
        ranking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FetchError, FormatError, PeppyError};
    use crate::source::FileSource;
    use async_trait::async_trait;
    use std::path::Path;

    const TOPIC_DOCUMENT: &str = r#"{
        "messages": [
            {"id": 11, "sender_id": 100, "body": {"parsed": "", "plain": "Launch day!!!", "rich": ""}},
            {"id": 12, "sender_id": 200, "body": {"parsed": "", "plain": "ok", "rich": ""}},
            {"id": 13, "sender_id": 100, "body": {"parsed": "", "plain": "sooo good", "rich": ""}},
            {"id": 14, "sender_id": 200, "body": {"parsed": "", "plain": "やったっ！", "rich": ""}}
        ],
        "references": [
            {"type": "thread", "id": 11},
            {"type": "user", "id": 200, "full_name": "佐藤 花子"},
            {"type": "user", "id": 100, "full_name": "Alice Example"}
        ],
        "meta": {}
    }"#;

    struct FailingSource;

    #[async_trait]
    impl MessageSource for FailingSource {
        fn describe(&self) -> String {
            "nowhere".to_string()
        }

        async fn fetch_messages_about_topic(&self) -> std::result::Result<String, FetchError> {
            Err(FetchError::LoginFormNotFound)
        }
    }

    fn output_in(dir: &Path) -> OutputSettings {
        OutputSettings {
            messages_path: dir.join("messages.json"),
            ranking_path: dir.join("ranking.json"),
            pretty: false,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("topic.json");
        std::fs::write(&input, TOPIC_DOCUMENT).unwrap();
        let output = output_in(dir.path());

        let outcome = run(&FileSource::new(&input), &output, 3).await.unwrap();

        // 100: "!!!" = 3, "ooo" = 3. 200: two "っ" and one "！" = 3.
        assert_eq!(outcome.message_count, 4);
        assert_eq!(
            outcome.ranking,
            vec![
                SenderScore::new(100, 6).with_name("Alice Example"),
                SenderScore::new(200, 3).with_name("佐藤 花子"),
            ]
        );

        let ranking = std::fs::read_to_string(&output.ranking_path).unwrap();
        assert_eq!(
            ranking,
            r#"[{"senderId":100,"peppyScore":6,"senderName":"Alice Example"},{"senderId":200,"peppyScore":3,"senderName":"佐藤 花子"}]"#
        );

        let messages: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output.messages_path).unwrap())
                .unwrap();
        assert_eq!(messages.as_array().map(Vec::len), Some(4));
        assert_eq!(messages[0]["id"], 11);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(dir.path());

        let err = run(&FailingSource, &output, 3).await.unwrap_err();

        assert!(matches!(err, PeppyError::Fetch(FetchError::LoginFormNotFound)));
        assert!(!output.messages_path.exists());
        assert!(!output.ranking_path.exists());
    }

    #[tokio::test]
    async fn test_malformed_document_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("topic.json");
        std::fs::write(&input, r#"{"messages": []}"#).unwrap();

        let err = run(&FileSource::new(&input), &output_in(dir.path()), 3)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PeppyError::Format(FormatError::MissingField("references"))
        ));
    }

    #[test]
    fn test_rank_feed_respects_top_n() {
        let feed = TopicFeed::parse(TOPIC_DOCUMENT).unwrap();
        let top = rank_feed(&feed, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].sender_id, 100);
    }
}
