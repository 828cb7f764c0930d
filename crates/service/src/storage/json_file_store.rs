use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::errors::StoreError;
use crate::feedback::domain::FeedbackRecord;
use crate::storage::record_store::RecordStore;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkerDoc {
    last_submit_at: DateTime<Utc>,
}

/// JSON file-backed record store.
///
/// The record array lives in one file and the rate-limit marker in a sibling
/// file. Writes go to `<file>.tmp` and are renamed into place, so readers see
/// either the old or the new snapshot.
#[derive(Clone, Debug)]
pub struct JsonFileRecordStore {
    records_path: PathBuf,
    marker_path: PathBuf,
}

impl JsonFileRecordStore {
    /// Initialize the store. Creates parent dirs and an empty record file if missing.
    pub async fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        records_path: P,
        marker_path: Q,
    ) -> Result<Arc<Self>, StoreError> {
        let records_path = records_path.into();
        let marker_path = marker_path.into();
        for path in [&records_path, &marker_path] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::StorageWriteFailed(format!("{}: {e}", parent.display()))
                })?;
            }
        }

        let store = Self { records_path, marker_path };
        if fs::metadata(&store.records_path).await.is_err() {
            store.save_all(&[]).await?;
        }
        Ok(Arc::new(store))
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(StoreError::StorageCorrupt(format!("cannot read {}: {e}", path.display())))
            }
        }
    }

    async fn write_atomic(path: &Path, data: Vec<u8>) -> Result<(), StoreError> {
        let mut tmp: OsString = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, data)
            .await
            .map_err(|e| StoreError::StorageWriteFailed(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::StorageWriteFailed(format!("{}: {e}", path.display())))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn load_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        match Self::read_optional(&self.records_path).await? {
            None => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::StorageCorrupt(e.to_string())),
        }
    }

    async fn save_all(&self, records: &[FeedbackRecord]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(records)
            .map_err(|e| StoreError::StorageWriteFailed(e.to_string()))?;
        Self::write_atomic(&self.records_path, data).await?;
        debug!(count = records.len(), path = %self.records_path.display(), "records saved");
        Ok(())
    }

    async fn load_marker(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        match Self::read_optional(&self.marker_path).await? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice::<MarkerDoc>(&bytes)
                .map(|doc| Some(doc.last_submit_at))
                .map_err(|e| StoreError::StorageCorrupt(e.to_string())),
        }
    }

    async fn save_marker(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        let data = serde_json::to_vec(&MarkerDoc { last_submit_at: at })
            .map_err(|e| StoreError::StorageWriteFailed(e.to_string()))?;
        Self::write_atomic(&self.marker_path, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::domain::{FeedbackCategory, FeedbackStatus};
    use crate::test_support::temp_store_paths;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn record(day: u32) -> FeedbackRecord {
        FeedbackRecord::new(
            Uuid::new_v4(),
            FeedbackCategory::Facilities,
            "The library air conditioning has been broken for two weeks now.".into(),
            None,
            NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        )
    }

    #[tokio::test]
    async fn json_file_store_persists_in_order() -> Result<(), anyhow::Error> {
        let (records_path, marker_path) = temp_store_paths();
        let store = JsonFileRecordStore::new(&records_path, &marker_path).await?;

        // initially empty
        assert!(store.load_all().await?.is_empty());
        assert_eq!(store.load_marker().await?, None);

        let mut records = vec![record(3), record(1), record(2)];
        records[1].set_status(FeedbackStatus::Addressed);
        records[2].archive();
        store.save_all(&records).await?;

        // reopen and check order, status and archive state survive
        let reopened = JsonFileRecordStore::new(&records_path, &marker_path).await?;
        let loaded = reopened.load_all().await?;
        assert_eq!(loaded, records);

        let at = Utc::now();
        reopened.save_marker(at).await?;
        let marker = store.load_marker().await?.expect("marker written");
        assert_eq!(marker.timestamp_millis(), at.timestamp_millis());

        let _ = fs::remove_file(&records_path).await;
        let _ = fs::remove_file(&marker_path).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_reports_storage_corrupt() -> Result<(), anyhow::Error> {
        let (records_path, marker_path) = temp_store_paths();
        let store = JsonFileRecordStore::new(&records_path, &marker_path).await?;
        fs::write(&records_path, b"{\"not\": \"an array\"}").await?;

        assert!(matches!(store.load_all().await, Err(StoreError::StorageCorrupt(_))));

        let _ = fs::remove_file(&records_path).await;
        Ok(())
    }

    #[tokio::test]
    async fn write_into_missing_dir_fails() -> Result<(), anyhow::Error> {
        let (records_path, marker_path) = temp_store_paths();
        let store = JsonFileRecordStore::new(&records_path, &marker_path).await?;
        if let Some(dir) = records_path.parent() {
            fs::remove_dir_all(dir).await?;
        }

        let err = store.save_all(&[record(1)]).await.unwrap_err();
        assert!(matches!(err, StoreError::StorageWriteFailed(_)));
        Ok(())
    }

    #[tokio::test]
    async fn unusable_data_dir_fails_at_open() -> Result<(), anyhow::Error> {
        let (records_path, _) = temp_store_paths();
        let blocker = records_path.parent().expect("per-test dir").to_path_buf();
        fs::write(&blocker, b"not a directory").await?;

        let nested = blocker.join("data");
        let err = JsonFileRecordStore::new(nested.join("feedbacks.json"), nested.join("m.json"))
            .await
            .unwrap_err();
        match err {
            StoreError::StorageWriteFailed(msg) => {
                assert!(msg.contains(&*nested.to_string_lossy()))
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let _ = fs::remove_file(&blocker).await;
        Ok(())
    }
}
