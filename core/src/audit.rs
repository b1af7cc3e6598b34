use crate::error::{ErrorCode, TownpetError};
use crate::model::{PostType, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOperation {
    KeywordScreen,
    ContactModeration,
    PostWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Allowed,
    Masked,
    Blocked,
}

/// One moderation decision. Never carries the submitted text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub sequence: u64,
    pub operation: AuditOperation,
    pub outcome: AuditOutcome,
    pub actor_role: UserRole,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_type: Option<PostType>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl AuditEvent {
    pub fn new(operation: AuditOperation, outcome: AuditOutcome, actor_role: UserRole) -> Self {
        Self {
            sequence: 0,
            operation,
            outcome,
            actor_role,
            signals: Vec::new(),
            matched_keywords: Vec::new(),
            post_type: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_signals<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signals = signals.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_matched_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matched_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_post_type(mut self, post_type: PostType) -> Self {
        self.post_type = Some(post_type);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink lock poisoned")]
    LockPoisoned,
    #[error("audit io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TownpetError for AuditError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::Internal
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

#[derive(Default)]
pub struct InMemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
    sequence: AtomicU64,
}

impl InMemoryAuditSink {
    pub fn events(&self) -> Result<Vec<AuditEvent>, AuditError> {
        let events = self.events.lock().map_err(|_| AuditError::LockPoisoned)?;
        Ok(events.clone())
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, mut event: AuditEvent) -> Result<(), AuditError> {
        event.sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut events = self.events.lock().map_err(|_| AuditError::LockPoisoned)?;
        events.push(event);
        Ok(())
    }
}

/// Appends one JSON object per line.
pub struct JsonlAuditSink {
    writer: Mutex<std::fs::File>,
    sequence: AtomicU64,
}

impl JsonlAuditSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;

        Ok(Self {
            writer: Mutex::new(writer),
            sequence: AtomicU64::new(0),
        })
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, mut event: AuditEvent) -> Result<(), AuditError> {
        event.sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let line = serde_json::to_string(&event)?;
        let mut writer = self.writer.lock().map_err(|_| AuditError::LockPoisoned)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn in_memory_sink_records_monotonic_sequence() {
        let sink = InMemoryAuditSink::default();

        sink.record(AuditEvent::new(
            AuditOperation::KeywordScreen,
            AuditOutcome::Allowed,
            UserRole::User,
        ))
        .unwrap();
        sink.record(AuditEvent::new(
            AuditOperation::ContactModeration,
            AuditOutcome::Blocked,
            UserRole::User,
        ))
        .unwrap();

        let events = sink.events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);
        assert_eq!(events[1].outcome, AuditOutcome::Blocked);
    }

    #[test]
    fn jsonl_sink_writes_signals_and_post_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit/moderation.log");
        let sink = JsonlAuditSink::open(&path).unwrap();

        let event = AuditEvent::new(
            AuditOperation::PostWrite,
            AuditOutcome::Blocked,
            UserRole::User,
        )
        .with_post_type(PostType::MarketListing)
        .with_signals(["phone"]);
        sink.record(event).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"operation\":\"post_write\""));
        assert!(content.contains("\"post_type\":\"MARKET_LISTING\""));
        assert!(content.contains("\"signals\":[\"phone\"]"));
        assert!(!content.contains("matched_keywords"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn sink_failures_are_internal_errors() {
        let err = AuditError::LockPoisoned;
        assert_eq!(err.error_code(), ErrorCode::Internal);
        assert_eq!(err.error_code().http_status(), 500);
    }
}
