//! Error type for the grid engine and its import/export codec.
//!
//! Only genuine failures live here. Edits on read-only cells and navigation
//! past the grid edge are absorbed by the reducer and never become errors.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Error parsing file: {0}")]
    Parse(String),

    #[error("Error parsing file: duplicate row id {0}")]
    DuplicateId(u64),

    #[error("Error parsing file: row ids must be positive")]
    InvalidId,

    #[error("Value '{value}' is not allowed in column '{column}'")]
    Rejected { column: &'static str, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        GridError::Parse(e.to_string())
    }
}

impl GridError {
    /// True for failures caused by the content of an import file.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            GridError::Parse(_) | GridError::DuplicateId(_) | GridError::InvalidId
        )
    }

    /// Message shown in the blocking notification for a failed import.
    pub fn import_message(&self) -> String {
        match self {
            GridError::Io(e) => format!("Could not read file: {}", e),
            other => format!("Import failed: {}", other),
        }
    }
}

pub type GridResult<T> = std::result::Result<T, GridError>;
