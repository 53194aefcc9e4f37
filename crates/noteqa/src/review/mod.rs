//! Review workflow: select a note, edit its response, approve, save.
//!
//! # Usage
//!
//! ```no_run
//! use noteqa::generate::StubGenerator;
//! use noteqa::review::ReviewSession;
//! use noteqa::{ColumnSchema, LoadMode};
//!
//! let mut session =
//!     ReviewSession::open("saved_expert_responses.xlsx", ColumnSchema::default()).unwrap();
//!
//! let bytes = std::fs::read("notes.xlsx").unwrap();
//! session
//!     .load_bytes("notes.xlsx", &bytes, LoadMode::HasResponse, &StubGenerator::new())
//!     .unwrap();
//!
//! let next = session.unreviewed()[0].note_id.clone();
//! session.select(&next).unwrap();
//! session.edit("Edited response").unwrap();
//! session.approve().unwrap();
//! session.save().unwrap();
//! ```

mod session;
mod state;

pub use session::ReviewSession;
pub use state::{ReviewState, SessionStatus};
