//! Durable record storage behind a trait.
//!
//! The pipeline only ever needs point lookups, conditional inserts, partial
//! updates, and status scans, so the trait stays that narrow. Production
//! deployments back it with a document store; the in-memory implementation
//! here serves tests and local runs.

use std::collections::HashMap;

use alloy_primitives::{Bytes, FixedBytes};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{PathwayError, Result};
use crate::message::{MessageKey, ReceiveMessage, Status};

/// Partial update applied to a stored record. Only set fields change.
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub status: Option<Status>,
    pub nonce: Option<u64>,
    pub message_bytes: Option<Bytes>,
    pub message_hash: Option<FixedBytes<32>>,
    pub destination_block_height_at_deposit: Option<u64>,
    pub circle_attestation: Option<Bytes>,
    pub receive_hash: Option<String>,
    pub retry_at: Option<Option<DateTime<Utc>>>,
    pub retry_count: Option<u32>,
}

impl StatusUpdate {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Apply to a record, enforcing the status lifecycle.
    pub fn apply(self, record: &mut ReceiveMessage) -> Result<()> {
        if let Some(status) = self.status {
            record.transition(status)?;
        }
        if let Some(nonce) = self.nonce {
            record.nonce = nonce;
        }
        if let Some(bytes) = self.message_bytes {
            record.message_bytes = bytes;
        }
        if let Some(hash) = self.message_hash {
            record.message_hash = hash;
        }
        if let Some(height) = self.destination_block_height_at_deposit {
            record.destination_block_height_at_deposit = height;
        }
        if let Some(attestation) = self.circle_attestation {
            record.circle_attestation = Some(attestation);
        }
        if let Some(hash) = self.receive_hash {
            record.receive_hash = Some(hash);
        }
        if let Some(retry_at) = self.retry_at {
            record.retry_at = retry_at;
        }
        if let Some(count) = self.retry_count {
            record.retry_count = count;
        }
        Ok(())
    }
}

/// Record storage used by the API and every relay stage.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn get(&self, key: &MessageKey) -> Result<Option<ReceiveMessage>>;

    /// Insert a new record; a key collision is a [`PathwayError::DuplicateRecord`].
    async fn put_if_absent(&self, record: ReceiveMessage) -> Result<()>;

    /// Apply a partial update to an existing record.
    async fn update(&self, key: &MessageKey, update: StatusUpdate) -> Result<ReceiveMessage>;

    async fn delete(&self, key: &MessageKey) -> Result<()>;

    /// All records currently in `status`, in no particular order.
    async fn scan_by_status(&self, status: Status) -> Result<Vec<ReceiveMessage>>;
}

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for std::sync::Arc<T> {
    async fn get(&self, key: &MessageKey) -> Result<Option<ReceiveMessage>> {
        (**self).get(key).await
    }

    async fn put_if_absent(&self, record: ReceiveMessage) -> Result<()> {
        (**self).put_if_absent(record).await
    }

    async fn update(&self, key: &MessageKey, update: StatusUpdate) -> Result<ReceiveMessage> {
        (**self).update(key, update).await
    }

    async fn delete(&self, key: &MessageKey) -> Result<()> {
        (**self).delete(key).await
    }

    async fn scan_by_status(&self, status: Status) -> Result<Vec<ReceiveMessage>> {
        (**self).scan_by_status(status).await
    }
}

/// Map-backed store for tests and local runs.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<MessageKey, ReceiveMessage>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn get(&self, key: &MessageKey) -> Result<Option<ReceiveMessage>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put_if_absent(&self, record: ReceiveMessage) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.key) {
            return Err(PathwayError::DuplicateRecord {
                key: record.key.to_string(),
            });
        }
        records.insert(record.key.clone(), record);
        Ok(())
    }

    async fn update(&self, key: &MessageKey, update: StatusUpdate) -> Result<ReceiveMessage> {
        let mut records = self.records.write().await;
        let record = records.get_mut(key).ok_or_else(|| PathwayError::RecordNotFound {
            key: key.to_string(),
        })?;
        update.apply(record)?;
        Ok(record.clone())
    }

    async fn delete(&self, key: &MessageKey) -> Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn scan_by_status(&self, status: Status) -> Result<Vec<ReceiveMessage>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use crate::path::Path;
    use alloy_primitives::U256;

    fn record(key: &str, status: Status) -> ReceiveMessage {
        ReceiveMessage::builder()
            .key(MessageKey::new(key))
            .status(status)
            .block_confirmation_in_ms(780_000)
            .original_path(Path {
                from_chain: Chain::Base,
                to_chain: Chain::Noble,
                sender_address: "0xeB4EaE8072bF3e2608f05B6812CD95133BF71504".to_string(),
                receiver_address: "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek".to_string(),
                amount: U256::from(25_000_000u64),
                fee: U256::from(660_000u64),
            })
            .submitted_at(Utc::now())
            .build()
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryStore::new();
        store.put_if_absent(record("0xaa", Status::Waiting)).await.unwrap();
        let err = store.put_if_absent(record("0xAA", Status::Waiting)).await;
        assert!(matches!(err, Err(PathwayError::DuplicateRecord { .. })));
    }

    #[tokio::test]
    async fn update_applies_only_set_fields() {
        let store = InMemoryStore::new();
        store.put_if_absent(record("0xaa", Status::Pending)).await.unwrap();

        let update = StatusUpdate {
            status: Some(Status::Attested),
            circle_attestation: Some(Bytes::from(vec![1, 2, 3])),
            ..Default::default()
        };
        let updated = store.update(&MessageKey::new("0xaa"), update).await.unwrap();
        assert_eq!(updated.status, Status::Attested);
        assert_eq!(updated.circle_attestation, Some(Bytes::from(vec![1, 2, 3])));
        assert_eq!(updated.block_confirmation_in_ms, 780_000);
    }

    #[tokio::test]
    async fn update_enforces_the_lifecycle() {
        let store = InMemoryStore::new();
        store.put_if_absent(record("0xaa", Status::Waiting)).await.unwrap();

        let err = store
            .update(&MessageKey::new("0xaa"), StatusUpdate::status(Status::Received))
            .await;
        assert!(err.is_err());

        // The record is untouched after a rejected transition.
        let unchanged = store.get(&MessageKey::new("0xaa")).await.unwrap().unwrap();
        assert_eq!(unchanged.status, Status::Waiting);
    }

    #[tokio::test]
    async fn scan_filters_by_status() {
        let store = InMemoryStore::new();
        store.put_if_absent(record("0xaa", Status::Waiting)).await.unwrap();
        store.put_if_absent(record("0xbb", Status::Pending)).await.unwrap();
        store.put_if_absent(record("0xcc", Status::Pending)).await.unwrap();

        assert_eq!(store.scan_by_status(Status::Pending).await.unwrap().len(), 2);
        assert_eq!(store.scan_by_status(Status::Received).await.unwrap().len(), 0);

        store.delete(&MessageKey::new("0xbb")).await.unwrap();
        assert_eq!(store.scan_by_status(Status::Pending).await.unwrap().len(), 1);
    }
}
