//! Build record persistence.

mod record;

pub use record::{BuildRecord, PLACEHOLDER_TAG, RecordStore};
