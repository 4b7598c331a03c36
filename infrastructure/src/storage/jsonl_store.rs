//! JSONL file writer for exchange pairs.
//!
//! Each [`ExchangePair`] becomes one JSON line in the persisted record shape
//! (`start_conversation`, `end_conversation`, `created_at`, `updated_at`),
//! appended to the file via a buffered writer.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use duet_application::ports::conversation_store::{ConversationStore, StoreError};
use duet_domain::ExchangePair;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// One persisted exchange pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Participant A's reply
    pub start_conversation: String,
    /// Participant B's answer to it
    pub end_conversation: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&ExchangePair> for ConversationRecord {
    fn from(pair: &ExchangePair) -> Self {
        Self {
            start_conversation: pair.first_participant_response.clone(),
            end_conversation: pair.second_participant_response.clone(),
            created_at: rfc3339(pair.created_at),
            updated_at: rfc3339(pair.updated_at),
        }
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Conversation store that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`, so every worker can append
/// concurrently. Each record is flushed before `append` returns.
pub struct JsonlConversationStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationStore {
    /// Open the store at `path`, keeping any records already there.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConversationStore for JsonlConversationStore {
    async fn append(&self, pair: &ExchangePair) -> Result<(), StoreError> {
        let line = serde_json::to_string(&ConversationRecord::from(pair))?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        debug!("Stored exchange pair in {}", self.path.display());
        Ok(())
    }
}

impl Drop for JsonlConversationStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
