//! Service layer for the feedback portal.
//! - `storage` owns persistence of the record collection.
//! - `feedback` enforces submission validation, rate limiting and triage.
//! - Errors are typed per operation; raw storage errors stay inside this crate.

pub mod errors;
pub mod feedback;
pub mod storage;
#[cfg(test)]
pub mod test_support;
