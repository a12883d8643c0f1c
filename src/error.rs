//! Error types for the row store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the pager and the table.
///
/// Some of them are reported to the user and the command loop keeps going,
/// the rest abort the session. See [`DbError::is_fatal`].
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Error opening file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid page capacity {max_pages}: must be at least 1 and addressable.")]
    InvalidCapacity { max_pages: usize },

    #[error("Tried to fetch page number out of bounds. {page_num} >= {max_pages}")]
    PageOutOfBounds { page_num: usize, max_pages: usize },

    #[error("Tried to flush null page {0}.")]
    PageNotResident(usize),

    #[error("Tried to flush {byte_count} bytes of a page, at most {page_size} allowed.")]
    FlushTooLarge { byte_count: usize, page_size: usize },

    #[error("Error reading page {page_num}: {source}")]
    Read {
        page_num: usize,
        #[source]
        source: io::Error,
    },

    #[error("Error writing page {page_num}: {source}")]
    Write {
        page_num: usize,
        #[source]
        source: io::Error,
    },

    #[error("Table full.")]
    TableFull { max_rows: usize },

    #[error("Invalid {field}: {reason}.")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Row {row_num} is corrupt.")]
    CorruptRow { row_num: usize },
}

impl DbError {
    /// Returns true when the session cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DbError::TableFull { .. } | DbError::InvalidField { .. } | DbError::CorruptRow { .. }
        )
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;
