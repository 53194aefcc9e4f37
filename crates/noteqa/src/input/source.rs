//! Metadata about an uploaded file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Metadata about a loaded spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name as uploaded.
    pub file: String,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (xlsx, csv, tsv).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has just been parsed.
    pub fn new(
        file: impl Into<String>,
        contents: &[u8],
        format: impl Into<String>,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        Self {
            file: file.into(),
            hash: content_hash(contents),
            size_bytes: contents.len() as u64,
            format: format.into(),
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// Hash file contents as `sha256:<hex>`.
pub(crate) fn content_hash(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    format!("sha256:{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_hash_is_stable() {
        let a = SourceMetadata::new("a.csv", b"x,y\n1,2\n", "csv", 1, 2);
        let b = SourceMetadata::new("b.csv", b"x,y\n1,2\n", "csv", 1, 2);
        assert_eq!(a.hash, b.hash);
        assert!(a.hash.starts_with("sha256:"));
        assert_eq!(a.size_bytes, 8);
    }
}
