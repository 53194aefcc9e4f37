//! Review cycle states and session status.

use serde::{Deserialize, Serialize};

/// Where the current review cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    /// A note has been chosen; the draft is its generated response.
    Selected,
    /// The draft has been edited since selection or approval.
    Editing,
    /// An approved response exists for the selected note.
    Approved,
    /// The approved response has been written to the store.
    Saved,
}

impl ReviewState {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ReviewState::Selected => "Selected",
            ReviewState::Editing => "Editing",
            ReviewState::Approved => "Approved",
            ReviewState::Saved => "Saved",
        }
    }
}

/// Overall progress of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// No file has been loaded yet.
    NoRecords,
    /// Some loaded notes still await review.
    InProgress { remaining: usize, reviewed: usize },
    /// Every loaded note has been reviewed.
    Complete { reviewed: usize },
}

impl SessionStatus {
    /// Whether every loaded note has been reviewed.
    pub fn is_complete(&self) -> bool {
        matches!(self, SessionStatus::Complete { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_with_tag() {
        let json = serde_json::to_value(SessionStatus::InProgress {
            remaining: 2,
            reviewed: 1,
        })
        .unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["remaining"], 2);

        assert!(SessionStatus::Complete { reviewed: 3 }.is_complete());
        assert!(!SessionStatus::NoRecords.is_complete());
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(ReviewState::Approved.label(), "Approved");
        assert_eq!(
            serde_json::to_value(ReviewState::Editing).unwrap(),
            "editing"
        );
    }
}
