use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while discovering, downloading or loading a dataset.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported dataset '{0}', expected one of: {1}")]
    UnsupportedDataset(String, String),

    #[error("the given path '{}' does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("column(s) {0:?} is/are not valid grouping columns")]
    InvalidGroupColumns(Vec<String>),

    #[error("test size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A metadata row points at a directory, not a data file.
    #[error("'{}' is a directory row; resolve it into files before loading", .0.display())]
    DirectoryRow(PathBuf),

    #[error("file format not accepted for '{}', use CSV/XLSX/Parquet", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("inconsistent number of columns in file {}. Expected: {expected}, Actual: {actual}", .path.display())]
    ColumnMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("error while loading {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("error while writing {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    #[error("metadata table is empty, nothing to load")]
    EmptyMetadata,

    #[error("archive extracted but '{}' is missing", .0.display())]
    MissingBaseFolder(PathBuf),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Why a download or extraction failed.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to download {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP {status} downloading {url}")]
    Http { url: String, status: u16 },

    #[error("failed to extract {}: {reason}", .path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("download or extraction of {0} interrupted")]
    Interrupted(String),

    #[error("I/O error while fetching {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
