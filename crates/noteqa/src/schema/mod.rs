//! Column schema: the role-to-label mapping the workflow reads and writes through.

mod column;
mod mode;

pub use column::{ColumnRole, ColumnSchema, SchemaPreset};
pub use mode::LoadMode;
