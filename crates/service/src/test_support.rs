#![cfg(test)]
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Fixed start instant for clock-driven tests (mid-morning, so a few minutes
/// of advancing stays on the same date).
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0).unwrap()
}

/// A message of exactly `len` characters.
pub fn message_of_len(len: usize) -> String {
    let base = "The practical sessions start late and end without any debrief. ";
    base.chars().cycle().take(len).collect()
}

/// Record and marker paths inside a fresh per-test directory.
pub fn temp_store_paths() -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("feedback_store_{}", Uuid::new_v4()));
    (dir.join("feedbacks.json"), dir.join("last_submit.json"))
}
