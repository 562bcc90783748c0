use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures raised while reading or writing the catalog file. None of these
/// are fatal; callers report them and carry on with the in-memory catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no catalog file at {}", .path.display())]
    Missing { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage error on {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error(
        "{} uses catalog format version {found}, expected {expected}",
        .path.display()
    )]
    UnsupportedFormat {
        path: PathBuf,
        found: i64,
        expected: i64,
    },
}

impl CatalogError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn storage(path: &Path, source: rusqlite::Error) -> Self {
        CatalogError::Storage {
            path: path.to_path_buf(),
            source,
        }
    }

    /// A missing file is the normal first-run condition rather than a fault.
    pub fn is_missing(&self) -> bool {
        matches!(self, CatalogError::Missing { .. })
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
