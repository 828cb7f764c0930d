use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::feedback::domain::FeedbackRecord;

/// Durable, ordered collection of feedback records plus the rate-limit marker.
/// Implementations can be file-backed, in-memory, or remote KV.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records, archived included, in append order. Empty when nothing
    /// was persisted.
    async fn load_all(&self) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Replace the whole persisted collection.
    async fn save_all(&self, records: &[FeedbackRecord]) -> Result<(), StoreError>;

    async fn load_marker(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    async fn save_marker(&self, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Position of the record with `id`, if any.
pub fn find_index(records: &[FeedbackRecord], id: Uuid) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::domain::FeedbackCategory;
    use chrono::NaiveDate;

    #[test]
    fn find_index_locates_by_id() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let record = || {
            FeedbackRecord::new(Uuid::new_v4(), FeedbackCategory::Other, "m".into(), None, date)
        };
        let records: Vec<_> = (0..3).map(|_| record()).collect();
        assert_eq!(find_index(&records, records[2].id()), Some(2));
        assert_eq!(find_index(&records, Uuid::new_v4()), None);
        assert_eq!(find_index(&[], Uuid::new_v4()), None);
    }
}
