//! Load modes for uploaded files.

use serde::{Deserialize, Serialize};

use super::column::ColumnRole;

/// How the generated response for each record is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// The file already carries a generated-response column.
    #[default]
    HasResponse,
    /// Responses are produced per row from the prompt column.
    NeedsGeneration,
}

impl LoadMode {
    /// Label shown in the mode selector.
    pub fn label(&self) -> &'static str {
        match self {
            LoadMode::HasResponse => "Includes LLM-generated Response",
            LoadMode::NeedsGeneration => "Needs LLM to generate Response",
        }
    }

    /// The column roles an uploaded file must provide in this mode.
    pub fn required_roles(&self) -> [ColumnRole; 4] {
        let response_source = match self {
            LoadMode::HasResponse => ColumnRole::GeneratedResponse,
            LoadMode::NeedsGeneration => ColumnRole::Prompt,
        };
        [
            ColumnRole::NoteId,
            ColumnRole::Question,
            ColumnRole::ClinicalText,
            response_source,
        ]
    }
}

impl std::str::FromStr for LoadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "has_response" | "response" | "includes_response" => Ok(LoadMode::HasResponse),
            "needs_generation" | "generate" | "prompt" => Ok(LoadMode::NeedsGeneration),
            _ => Err(format!(
                "Unknown mode: {}. Use: has-response or needs-generation.",
                s
            )),
        }
    }
}

impl std::fmt::Display for LoadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadMode::HasResponse => write!(f, "has-response"),
            LoadMode::NeedsGeneration => write!(f, "needs-generation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_roles_by_mode() {
        assert!(LoadMode::HasResponse
            .required_roles()
            .contains(&ColumnRole::GeneratedResponse));
        assert!(!LoadMode::HasResponse
            .required_roles()
            .contains(&ColumnRole::Prompt));
        assert!(LoadMode::NeedsGeneration
            .required_roles()
            .contains(&ColumnRole::Prompt));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("has-response".parse::<LoadMode>(), Ok(LoadMode::HasResponse));
        assert_eq!(
            "needs_generation".parse::<LoadMode>(),
            Ok(LoadMode::NeedsGeneration)
        );
        assert!("sometimes".parse::<LoadMode>().is_err());
        assert_eq!(LoadMode::NeedsGeneration.to_string(), "needs-generation");
    }
}
