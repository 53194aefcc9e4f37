//! Review session: the explicit state object behind one reviewer's run.

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{NoteQaError, Result};
use crate::generate::ResponseGenerator;
use crate::input::{SheetFormat, SourceMetadata};
use crate::schema::{ColumnSchema, LoadMode};
use crate::store::{load_with_metadata, unreviewed, PersistedStore, Record, ReviewedRecord};

use super::state::{ReviewState, SessionStatus};

/// The note currently under review.
#[derive(Debug, Clone)]
struct Cycle {
    note_id: String,
    draft: String,
    state: ReviewState,
}

/// State for one review session.
///
/// Created at session start from the persisted store, mutated one reviewer
/// action at a time, and discarded at exit. Loaded records are never
/// modified; edits live in the current cycle's draft and approvals live in a
/// map keyed by note id until saved.
#[derive(Debug)]
pub struct ReviewSession {
    schema: ColumnSchema,
    store: PersistedStore,
    records: Vec<Record>,
    source: Option<SourceMetadata>,
    loaded: bool,
    approved: IndexMap<String, String>,
    cycle: Option<Cycle>,
}

impl ReviewSession {
    /// Start a session backed by the store file at `store_path`.
    pub fn open(store_path: impl AsRef<Path>, schema: ColumnSchema) -> Result<Self> {
        let store = PersistedStore::open(store_path, schema)?;
        Ok(Self::with_store(store))
    }

    /// Start a session over an already opened store.
    pub fn with_store(store: PersistedStore) -> Self {
        Self {
            schema: store.schema().clone(),
            store,
            records: Vec::new(),
            source: None,
            loaded: false,
            approved: IndexMap::new(),
            cycle: None,
        }
    }

    /// Column schema in use.
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// The persisted store.
    pub fn store(&self) -> &PersistedStore {
        &self.store
    }

    /// Records from the most recent load.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Metadata for the most recently loaded file.
    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    /// Parse and install an uploaded file.
    ///
    /// On failure the previously loaded records stay in place.
    pub fn load_bytes(
        &mut self,
        name: &str,
        bytes: &[u8],
        mode: LoadMode,
        generator: &dyn ResponseGenerator,
    ) -> Result<usize> {
        let (records, source) = load_with_metadata(name, bytes, mode, &self.schema, generator)?;
        let count = records.len();
        self.load_records(records, Some(source));
        Ok(count)
    }

    /// Replace the working set of records.
    ///
    /// Any in-progress cycle ends; approvals made earlier in the session are
    /// kept, keyed by note id.
    pub fn load_records(&mut self, records: Vec<Record>, source: Option<SourceMetadata>) {
        self.records = records;
        self.source = source;
        self.loaded = true;
        self.cycle = None;

        info!(
            records = self.records.len(),
            remaining = self.unreviewed().len(),
            "records ready for review"
        );
    }

    /// Loaded records not yet in the store, in file order.
    pub fn unreviewed(&self) -> Vec<&Record> {
        unreviewed(&self.records, &self.store.reviewed_ids())
    }

    /// Overall progress.
    pub fn status(&self) -> SessionStatus {
        if !self.loaded {
            return SessionStatus::NoRecords;
        }

        let remaining = self.unreviewed().len();
        let reviewed = self.records.len() - remaining;

        if remaining == 0 {
            SessionStatus::Complete { reviewed }
        } else {
            SessionStatus::InProgress {
                remaining,
                reviewed,
            }
        }
    }

    /// Whether every loaded note has been reviewed.
    pub fn is_complete(&self) -> bool {
        self.status().is_complete()
    }

    /// Fraction of loaded records already reviewed (0.0 to 1.0).
    pub fn progress(&self) -> f64 {
        if self.records.is_empty() {
            return 1.0;
        }
        let remaining = self.unreviewed().len();
        (self.records.len() - remaining) as f64 / self.records.len() as f64
    }

    /// Begin reviewing `note_id`.
    ///
    /// The draft starts as the note's generated response. A note approved
    /// earlier in the session comes back in the `Approved` state.
    pub fn select(&mut self, note_id: &str) -> Result<&Record> {
        match self.status() {
            SessionStatus::NoRecords => {
                return Err(NoteQaError::Review("No file has been loaded".to_string()));
            }
            SessionStatus::Complete { .. } => {
                return Err(NoteQaError::Review(
                    "All notes have been reviewed".to_string(),
                ));
            }
            SessionStatus::InProgress { .. } => {}
        }

        if self.store.contains(note_id) {
            return Err(NoteQaError::Review(format!(
                "Note '{}' has already been reviewed",
                note_id
            )));
        }

        let record = self
            .records
            .iter()
            .find(|r| r.note_id == note_id)
            .ok_or_else(|| NoteQaError::Review(format!("Note '{}' not found", note_id)))?;

        let (draft, state) = match self.approved.get(note_id) {
            Some(approved) => (approved.clone(), ReviewState::Approved),
            None => (record.generated_response.clone(), ReviewState::Selected),
        };

        debug!(note_id, state = state.label(), "selected note");

        self.cycle = Some(Cycle {
            note_id: note_id.to_string(),
            draft,
            state,
        });

        Ok(record)
    }

    /// The record under review, if any.
    pub fn selected(&self) -> Option<&Record> {
        let cycle = self.cycle.as_ref()?;
        self.records.iter().find(|r| r.note_id == cycle.note_id)
    }

    /// Identifier of the note under review, if any.
    pub fn selected_id(&self) -> Option<&str> {
        self.cycle.as_ref().map(|c| c.note_id.as_str())
    }

    /// State of the current cycle.
    pub fn state(&self) -> Option<ReviewState> {
        self.cycle.as_ref().map(|c| c.state)
    }

    /// Current draft text.
    pub fn draft(&self) -> Option<&str> {
        self.cycle.as_ref().map(|c| c.draft.as_str())
    }

    /// Replace the draft text for this cycle.
    pub fn edit(&mut self, text: impl Into<String>) -> Result<()> {
        let cycle = self.open_cycle()?;
        cycle.draft = text.into();
        cycle.state = ReviewState::Editing;
        Ok(())
    }

    /// Record the current draft as the approved response.
    ///
    /// Approving again overwrites the earlier approval. Empty text is
    /// accepted.
    pub fn approve(&mut self) -> Result<&str> {
        let cycle = self.open_cycle()?;
        cycle.state = ReviewState::Approved;
        let note_id = cycle.note_id.clone();
        let draft = cycle.draft.clone();

        debug!(note_id = %note_id, chars = draft.len(), "approved response");

        self.approved.insert(note_id.clone(), draft);
        Ok(self.approved[&note_id].as_str())
    }

    /// Replace the draft and approve it in one step.
    pub fn approve_with(&mut self, text: impl Into<String>) -> Result<&str> {
        self.edit(text)?;
        self.approve()
    }

    /// Approved but unsaved response for a note.
    pub fn approved_response(&self, note_id: &str) -> Option<&str> {
        self.approved.get(note_id).map(String::as_str)
    }

    /// Whether the save action is available for the current cycle.
    pub fn can_save(&self) -> bool {
        match &self.cycle {
            Some(cycle) => {
                cycle.state != ReviewState::Saved && self.approved.contains_key(&cycle.note_id)
            }
            None => false,
        }
    }

    /// Write the approved response for the current note to the store.
    ///
    /// Fails with a review error if nothing is selected or the note has not
    /// been approved. A persistence failure keeps the approval and the
    /// selection so the save can be retried.
    pub fn save(&mut self) -> Result<ReviewedRecord> {
        let cycle = self
            .cycle
            .as_ref()
            .ok_or_else(|| NoteQaError::Review("No note selected".to_string()))?;

        if cycle.state == ReviewState::Saved {
            return Err(NoteQaError::Review(format!(
                "Note '{}' has already been saved",
                cycle.note_id
            )));
        }

        let note_id = cycle.note_id.clone();
        let expert_response = self.approved.get(&note_id).cloned().ok_or_else(|| {
            NoteQaError::Review(format!(
                "Approve the response for note '{}' before saving",
                note_id
            ))
        })?;

        let record = self
            .records
            .iter()
            .find(|r| r.note_id == note_id)
            .ok_or_else(|| NoteQaError::Review(format!("Note '{}' not found", note_id)))?;
        let reviewed = ReviewedRecord::from_record(record, expert_response);

        if self.store.contains(&note_id) {
            // Only reachable after a failed write appended this note.
            if !self.store.is_dirty() {
                return Err(NoteQaError::Review(format!(
                    "Note '{}' has already been reviewed",
                    note_id
                )));
            }
            self.store.persist()?;
        } else {
            self.store.append_and_persist(reviewed.clone())?;
        }

        self.approved.shift_remove(&note_id);
        if let Some(cycle) = self.cycle.as_mut() {
            cycle.state = ReviewState::Saved;
        }

        info!(note_id = %note_id, saved = self.store.len(), "saved expert response");
        Ok(reviewed)
    }

    /// All reviewed records in the store.
    pub fn saved(&self) -> &[ReviewedRecord] {
        self.store.records()
    }

    /// Serialize all saved reviews for download.
    pub fn export_bytes(&self, format: SheetFormat) -> Result<Vec<u8>> {
        self.store.export_bytes(format)
    }

    /// Write all saved reviews to `path`.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<()> {
        self.store.export_to(path)
    }

    fn open_cycle(&mut self) -> Result<&mut Cycle> {
        match self.cycle.as_mut() {
            None => Err(NoteQaError::Review("No note selected".to_string())),
            Some(cycle) if cycle.state == ReviewState::Saved => Err(NoteQaError::Review(
                format!(
                    "Note '{}' has already been saved; select another note",
                    cycle.note_id
                ),
            )),
            Some(cycle) => Ok(cycle),
        }
    }
}
