//! Port for persisting exchanged pairs.
//!
//! Every worker appends to the same store concurrently, without coordinating
//! with the others; each append is one independent record.

use async_trait::async_trait;
use duet_domain::ExchangePair;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by a conversation store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only sink for completed exchange pairs
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn append(&self, pair: &ExchangePair) -> Result<(), StoreError>;
}

/// Discards every pair.
pub struct NoConversationStore;

#[async_trait]
impl ConversationStore for NoConversationStore {
    async fn append(&self, _pair: &ExchangePair) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Keeps pairs in memory in arrival order.
#[derive(Default)]
pub struct InMemoryConversationStore {
    pairs: Mutex<Vec<ExchangePair>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub fn pairs(&self) -> Vec<ExchangePair> {
        self.pairs
            .lock()
            .map(|pairs| pairs.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.pairs.lock().map(|pairs| pairs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, pair: &ExchangePair) -> Result<(), StoreError> {
        let mut pairs = self
            .pairs
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        pairs.push(pair.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_keeps_order() {
        let store = InMemoryConversationStore::new();
        store.append(&ExchangePair::new("a1", "b1")).await.unwrap();
        store.append(&ExchangePair::new("a2", "b2")).await.unwrap();

        let pairs = store.pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].first_participant_response, "a1");
        assert_eq!(pairs[1].second_participant_response, "b2");
    }

    #[tokio::test]
    async fn test_no_store_accepts_everything() {
        assert!(NoConversationStore.append(&ExchangePair::new("a", "b")).await.is_ok());
    }
}
