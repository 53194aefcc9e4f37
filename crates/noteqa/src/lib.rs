//! noteqa: expert review of LLM answers to questions about clinical notes.
//!
//! A reviewer uploads a spreadsheet of question/answer records, walks through
//! the notes not yet reviewed, edits and approves each generated answer, and
//! saves it to a persisted spreadsheet that survives restarts.
//!
//! # Core Principles
//!
//! - **Uploaded data is never modified**: edits live in the review session
//! - **Approve before save**: nothing reaches the store without an approval
//! - **Labels are configuration**: the workflow only sees column roles
//!
//! # Example
//!
//! ```no_run
//! use noteqa::generate::StubGenerator;
//! use noteqa::{ColumnSchema, LoadMode, ReviewSession};
//!
//! let mut session =
//!     ReviewSession::open("saved_expert_responses.xlsx", ColumnSchema::default()).unwrap();
//! let bytes = std::fs::read("notes.xlsx").unwrap();
//! session
//!     .load_bytes("notes.xlsx", &bytes, LoadMode::HasResponse, &StubGenerator::new())
//!     .unwrap();
//!
//! println!("Remaining: {}", session.unreviewed().len());
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod input;
pub mod review;
pub mod schema;
pub mod store;

pub use config::{ColumnsConfig, ReviewConfig};
pub use error::{NoteQaError, Result};
pub use input::{SheetFormat, SourceMetadata};
pub use review::{ReviewSession, ReviewState, SessionStatus};
pub use schema::{ColumnRole, ColumnSchema, LoadMode, SchemaPreset};
pub use store::{PersistedStore, Record, ReviewedRecord};
