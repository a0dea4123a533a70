//! Discover, download and tabulate machinery diagnostic datasets.
//!
//! A dataset tree `<root>/<case>/<subcase>/<file>` is scanned into a
//! [`MetadataTable`], optionally split into train/test tables, and loaded
//! into a `(files, rows, columns)` feature array with class labels.
//!
//! ```no_run
//! use machinery_diag::{load_arrays, load_metadata, split_metadata, DatasetKind};
//!
//! # fn main() -> machinery_diag::Result<()> {
//! let (metadata, classes) = load_metadata(None, DatasetKind::Laspi)?;
//! let (train, test) = split_metadata(&metadata, &["Speed"], 0.25, 42)?;
//! let (x_train, y_train) = load_arrays(&train)?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod data;
pub mod dataset;
pub mod error;
pub mod loaders;
mod progress;

pub use archive::{ArchiveProvider, HttpArchiveProvider};
pub use data::loader::{load_arrays, load_arrays_as, load_split_arrays, load_split_arrays_as, SplitArrays};
pub use data::model::{ClassMapping, MetadataRow, MetadataTable, MetadataValue, Source};
pub use data::scanner::{augment_from_glob, load_metadata, scan_metadata};
pub use data::splitter::split_metadata;
pub use dataset::{DatasetConfig, DatasetKind};
pub use error::{ArchiveError, Error, Result};
