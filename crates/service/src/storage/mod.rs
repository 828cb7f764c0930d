//! Storage abstractions for the feedback service
//!
//! The record collection is always read and written whole: every mutation is
//! a full snapshot replace, so one `save_all` is the unit of atomicity.

pub mod record_store;
pub mod json_file_store;
pub mod memory;

pub use record_store::{find_index, RecordStore};
pub use json_file_store::JsonFileRecordStore;
pub use memory::MemoryRecordStore;
