use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::errors::StoreError;
use crate::feedback::domain::FeedbackRecord;
use crate::storage::record_store::RecordStore;

/// In-process record store for tests and demos.
///
/// Keeps the collection as serialized JSON so the same encode/decode path as
/// the file store is exercised, and lets callers seed corrupt data or make
/// writes fail.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    raw: Mutex<Option<String>>,
    marker: Mutex<Option<DateTime<Utc>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw persisted text, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { raw: Mutex::new(Some(raw.into())), ..Self::default() }
    }

    /// Make every subsequent write fail with `StorageWriteFailed`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `save_all` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::StorageWriteFailed("quota exceeded".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        let raw = self.raw.lock().await;
        match raw.as_deref() {
            None => Ok(Vec::new()),
            Some(text) => {
                serde_json::from_str(text).map_err(|e| StoreError::StorageCorrupt(e.to_string()))
            }
        }
    }

    async fn save_all(&self, records: &[FeedbackRecord]) -> Result<(), StoreError> {
        self.check_writable()?;
        let text = serde_json::to_string(records)
            .map_err(|e| StoreError::StorageWriteFailed(e.to_string()))?;
        *self.raw.lock().await = Some(text);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_marker(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(*self.marker.lock().await)
    }

    async fn save_marker(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.marker.lock().await = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failing_writes_leave_previous_snapshot() -> Result<(), anyhow::Error> {
        let store = MemoryRecordStore::new();
        store.save_all(&[]).await?;
        assert_eq!(store.write_count(), 1);

        store.set_fail_writes(true);
        assert!(matches!(store.save_all(&[]).await, Err(StoreError::StorageWriteFailed(_))));
        assert!(store.save_marker(Utc::now()).await.is_err());
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.load_marker().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn seeded_garbage_is_corrupt() {
        let store = MemoryRecordStore::with_raw("not json");
        assert!(matches!(store.load_all().await, Err(StoreError::StorageCorrupt(_))));
    }
}
