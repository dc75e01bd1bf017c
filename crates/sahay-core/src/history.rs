//! Bounded conversation history (FIFO) and its on-disk log format.

use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// One query/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub response: String,
    pub language: Language,
}

/// Most recent exchanges, oldest dropped first once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    records: VecDeque<ConversationRecord>,
    capacity: usize,
}

/// Prefix of `text` holding at most `budget` chars.
pub fn take_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Like [`take_chars`], with `...` appended when anything was cut.
pub fn truncate_chars(text: &str, budget: usize) -> String {
    let head = take_chars(text, budget);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}

impl ConversationHistory {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: ConversationRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Append an exchange stamped with the current time.
    pub fn record(
        &mut self,
        query: impl Into<String>,
        response: impl Into<String>,
        language: Language,
    ) {
        self.push(ConversationRecord {
            timestamp: Utc::now(),
            query: query.into(),
            response: response.into(),
            language,
        });
    }

    /// Last `limit` records, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<ConversationRecord> {
        let skip = self.records.len().saturating_sub(limit);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Prompt excerpt of the last `exchanges`, responses cut to `budget` chars.
    pub fn excerpt(&self, exchanges: usize, budget: usize) -> String {
        if self.records.is_empty() {
            return "No previous conversation.".to_string();
        }
        let skip = self.records.len().saturating_sub(exchanges);
        self.records
            .iter()
            .skip(skip)
            .map(|r| {
                format!(
                    "User: {}\nAssistant: {}",
                    r.query,
                    truncate_chars(&r.response, budget)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Write the history as pretty UTF-8 JSON. Without an explicit path the log goes to
    /// `{data_dir}/conversation_logs/conversation_{unix_ts}.json`.
    pub async fn save_log(
        &self,
        path: Option<&Path>,
        data_dir: &Path,
    ) -> std::io::Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => data_dir
                .join("conversation_logs")
                .join(format!("conversation_{}.json", Utc::now().timestamp())),
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let records: Vec<&ConversationRecord> = self.records.iter().collect();
        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity_and_drops_oldest() {
        let mut history = ConversationHistory::new(10);
        for i in 0..15 {
            history.record(format!("q{i}"), format!("a{i}"), Language::English);
            assert!(history.len() <= 10);
        }
        assert_eq!(history.len(), 10);
        let recent = history.recent(10);
        assert_eq!(recent.first().map(|r| r.query.as_str()), Some("q5"));
        assert_eq!(recent.last().map(|r| r.query.as_str()), Some("q14"));
    }

    #[test]
    fn recent_returns_tail_oldest_first() {
        let mut history = ConversationHistory::new(5);
        for i in 0..4 {
            history.record(format!("q{i}"), "a", Language::Hindi);
        }
        let queries: Vec<String> = history.recent(2).into_iter().map(|r| r.query).collect();
        assert_eq!(queries, vec!["q2", "q3"]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let hindi = "नमस्ते".repeat(100);
        let cut = truncate_chars(&hindi, 7);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_chars("short", 200), "short");
    }

    #[test]
    fn empty_history_excerpt() {
        assert_eq!(
            ConversationHistory::default().excerpt(3, 200),
            "No previous conversation."
        );
    }

    #[test]
    fn excerpt_uses_last_exchanges_only() {
        let mut history = ConversationHistory::new(10);
        for i in 0..5 {
            history.record(format!("q{i}"), format!("a{i}"), Language::English);
        }
        let excerpt = history.excerpt(3, 200);
        assert!(!excerpt.contains("q1"));
        assert!(excerpt.starts_with("User: q2\nAssistant: a2"));
        assert!(excerpt.ends_with("User: q4\nAssistant: a4"));
    }
}
