//! Storage configuration from TOML (`[storage]` section)

use crate::storage::JsonlConversationStore;
use duet_application::StoreError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
///
/// ```toml
/// [storage]
/// conversation_log = "~/.local/share/duet/pairs.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// JSONL file receiving every exchange pair; unset discards pairs
    pub conversation_log: Option<PathBuf>,
}

impl FileStorageConfig {
    /// Log path with a leading `~/` expanded to the home directory
    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        let path = self.conversation_log.as_ref()?;
        if let Ok(rest) = path.strip_prefix("~")
            && let Some(home) = dirs::home_dir()
        {
            return Some(home.join(rest));
        }
        Some(path.clone())
    }

    /// Open the configured conversation log; `None` when no log is set
    pub fn open_log(&self) -> Result<Option<JsonlConversationStore>, StoreError> {
        self.conversation_log_path()
            .map(JsonlConversationStore::open)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_is_kept() {
        let config = FileStorageConfig {
            conversation_log: Some(PathBuf::from("data/pairs.jsonl")),
        };
        assert_eq!(
            config.conversation_log_path(),
            Some(PathBuf::from("data/pairs.jsonl"))
        );
    }

    #[test]
    fn test_home_prefix_is_expanded() {
        let config = FileStorageConfig {
            conversation_log: Some(PathBuf::from("~/pairs.jsonl")),
        };
        let path = config.conversation_log_path().unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("pairs.jsonl"));
        }
    }

    #[test]
    fn test_unset_log_opens_nothing() {
        let config = FileStorageConfig::default();
        assert!(config.conversation_log_path().is_none());
        assert!(config.open_log().unwrap().is_none());
    }

    #[test]
    fn test_configured_log_is_opened() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("pairs.jsonl");
        let config = FileStorageConfig {
            conversation_log: Some(path.clone()),
        };

        let store = config.open_log().unwrap().unwrap();
        assert_eq!(store.path(), path.as_path());
        assert!(path.exists());
    }
}
