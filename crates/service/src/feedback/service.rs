use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::domain::{FeedbackRecord, FeedbackStatus, FeedbackSubmission, ListFilter};
use crate::errors::{ListError, StoreError, SubmissionError, UpdateError};
use crate::storage::record_store::{find_index, RecordStore};

/// Submission rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackSettings {
    /// Minimum gap between two accepted submissions.
    pub rate_limit_ms: u64,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self { rate_limit_ms: 60_000, min_chars: 50, max_chars: 500 }
    }
}

/// Mutable per-instance state, guarded by the service mutex.
#[derive(Debug, Default)]
struct ServiceState {
    last_accepted: Option<DateTime<Utc>>,
}

/// Feedback lifecycle: validated, rate-limited submission plus the admin
/// triage operations.
///
/// Every mutation is one `load_all -> mutate -> save_all` cycle run while
/// holding `state`, so writes from this instance never interleave.
pub struct FeedbackService<S: RecordStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    settings: FeedbackSettings,
    state: Mutex<ServiceState>,
}

fn log_store_error(op: &'static str) -> impl Fn(&StoreError) {
    move |e| error!(error = %e, op, "storage failure")
}

impl<S: RecordStore> FeedbackService<S> {
    /// Service on the system clock with no rate-limit marker.
    pub fn new(store: Arc<S>, settings: FeedbackSettings) -> Self {
        Self::with_clock(store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, settings: FeedbackSettings, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, settings, state: Mutex::new(ServiceState::default()) }
    }

    /// Like `with_clock`, but restores the persisted rate-limit marker so a
    /// restart does not reopen the submission window.
    pub async fn open(
        store: Arc<S>,
        settings: FeedbackSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let last_accepted = store.load_marker().await?;
        let svc = Self::with_clock(store, settings, clock);
        svc.state.lock().await.last_accepted = last_accepted;
        Ok(svc)
    }

    pub fn settings(&self) -> &FeedbackSettings {
        &self.settings
    }

    /// When the last submission was accepted, if ever.
    pub async fn last_accepted(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_accepted
    }

    /// Validate and store a new submission.
    ///
    /// Checks run in order: rate limit, message length, category. The
    /// rate-limit marker moves only after the record is durably saved.
    /// Length is measured in UTF-16 code units, the unit browser clients
    /// count in.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::errors::SubmissionError;
    /// use service::feedback::{
    ///     FeedbackCategory, FeedbackService, FeedbackSettings, FeedbackStatus, FeedbackSubmission,
    /// };
    /// use service::storage::MemoryRecordStore;
    /// let store = Arc::new(MemoryRecordStore::new());
    /// let svc = FeedbackService::new(store, FeedbackSettings::default());
    /// let msg = "The hostel water supply fails every evening between six and nine.";
    /// let sub = FeedbackSubmission::new(FeedbackCategory::Facilities, msg);
    /// let rec = tokio_test::block_on(svc.submit(sub.clone())).unwrap();
    /// assert_eq!(rec.status(), FeedbackStatus::New);
    /// let again = tokio_test::block_on(svc.submit(sub));
    /// assert_eq!(again, Err(SubmissionError::RateLimited));
    /// ```
    #[instrument(skip(self, submission), fields(category = ?submission.category))]
    pub async fn submit(
        &self,
        submission: FeedbackSubmission,
    ) -> Result<FeedbackRecord, SubmissionError> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        if let Some(last) = state.last_accepted {
            let elapsed_ms = (now - last).num_milliseconds();
            if elapsed_ms < 0 || (elapsed_ms as u64) < self.settings.rate_limit_ms {
                warn!(elapsed_ms, "submission rate limited");
                return Err(SubmissionError::RateLimited);
            }
        }

        let len = submission.message.encode_utf16().count();
        if len < self.settings.min_chars || len > self.settings.max_chars {
            debug!(len, "message length out of bounds");
            return Err(SubmissionError::InvalidMessage {
                min: self.settings.min_chars,
                max: self.settings.max_chars,
            });
        }

        let category = submission.category.ok_or(SubmissionError::MissingCategory)?;

        let mut records = self
            .store
            .load_all()
            .await
            .inspect_err(log_store_error("submit"))
            .map_err(|_| SubmissionError::PersistenceFailed)?;
        let mut id = Uuid::new_v4();
        while find_index(&records, id).is_some() {
            id = Uuid::new_v4();
        }
        let record = FeedbackRecord::new(
            id,
            category,
            submission.message,
            submission.year_of_study,
            now.date_naive(),
        );
        records.push(record.clone());
        self.store
            .save_all(&records)
            .await
            .inspect_err(log_store_error("submit"))
            .map_err(|_| SubmissionError::PersistenceFailed)?;

        state.last_accepted = Some(now);
        if let Err(e) = self.store.save_marker(now).await {
            warn!(error = %e, "rate-limit marker not persisted");
        }

        info!(record_id = %record.id(), category = %record.category(), "feedback_submitted");
        Ok(record)
    }

    /// Non-archived records matching `filter`, newest date first. Records
    /// sharing a date keep their insertion order.
    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<FeedbackRecord>, ListError> {
        let records = self
            .store
            .load_all()
            .await
            .inspect_err(log_store_error("list_active"))
            .map_err(|_| ListError::PersistenceFailed)?;
        let mut active: Vec<FeedbackRecord> = records
            .into_iter()
            .filter(|r| !r.is_archived() && filter.matches(r))
            .collect();
        active.sort_by(|a, b| b.date().cmp(&a.date()));
        debug!(count = active.len(), "listed active records");
        Ok(active)
    }

    /// Set the status of any record, archived ones included.
    #[instrument(skip(self, id), fields(record_id = %id))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: FeedbackStatus,
    ) -> Result<(), UpdateError> {
        let _guard = self.state.lock().await;
        let mut records = self
            .store
            .load_all()
            .await
            .inspect_err(log_store_error("update_status"))
            .map_err(|_| UpdateError::PersistenceFailed)?;
        let idx = find_index(&records, id).ok_or(UpdateError::NotFound(id))?;

        records[idx].set_status(status);
        self.store
            .save_all(&records)
            .await
            .inspect_err(log_store_error("update_status"))
            .map_err(|_| UpdateError::PersistenceFailed)?;
        info!(archived = records[idx].is_archived(), "feedback_status_updated");
        Ok(())
    }

    /// Archive a record. It stays in the store and its id stays taken.
    /// Archiving an already archived record succeeds without writing.
    #[instrument(skip(self, id), fields(record_id = %id))]
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), UpdateError> {
        let _guard = self.state.lock().await;
        let mut records = self
            .store
            .load_all()
            .await
            .inspect_err(log_store_error("soft_delete"))
            .map_err(|_| UpdateError::PersistenceFailed)?;
        let idx = find_index(&records, id).ok_or(UpdateError::NotFound(id))?;

        if !records[idx].archive() {
            debug!("already archived");
            return Ok(());
        }
        self.store
            .save_all(&records)
            .await
            .inspect_err(log_store_error("soft_delete"))
            .map_err(|_| UpdateError::PersistenceFailed)?;
        info!("feedback_archived");
        Ok(())
    }
}
