//! Record store: loading uploaded records and persisting reviewed ones.
//!
//! ```text
//! reviews/
//! ├── notes.xlsx                        # Uploaded input (never modified)
//! ├── saved_expert_responses.xlsx       # Persisted store, rewritten on every save
//! └── saved_expert_responses.history/   # Optional backups of earlier versions
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use noteqa::generate::StubGenerator;
//! use noteqa::store::{load, unreviewed, PersistedStore, ReviewedRecord};
//! use noteqa::{ColumnSchema, LoadMode};
//!
//! let schema = ColumnSchema::default();
//! let bytes = std::fs::read("notes.xlsx").unwrap();
//! let records = load(&bytes, LoadMode::HasResponse, &schema, &StubGenerator::new()).unwrap();
//!
//! let mut store = PersistedStore::open("saved_expert_responses.xlsx", schema).unwrap();
//! let pending = unreviewed(&records, &store.reviewed_ids());
//!
//! let first = pending[0];
//! store
//!     .append_and_persist(ReviewedRecord::from_record(first, "Approved text"))
//!     .unwrap();
//! ```

mod loader;
mod persisted;
mod record;

pub use loader::{load, load_sheet, load_with_metadata, validate_columns};
pub use persisted::{history_directory, PersistedStore, DEFAULT_STORE_FILE};
pub use record::{Record, ReviewedRecord};

use std::collections::HashSet;

/// Identifiers already present in the persisted store.
pub fn reviewed_ids(store: &PersistedStore) -> HashSet<String> {
    store.reviewed_ids()
}

/// Records whose identifier has not been reviewed, in their original order.
///
/// Duplicate identifiers within `records` are kept; both disappear together
/// once that identifier is reviewed.
pub fn unreviewed<'a>(records: &'a [Record], reviewed: &HashSet<String>) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| !reviewed.contains(&r.note_id))
        .collect()
}
