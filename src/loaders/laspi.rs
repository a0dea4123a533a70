use std::path::Path;

use ndarray::{Array1, Array3};

use crate::data::loader::{load_arrays_as, load_split_arrays_as, SplitArrays};
use crate::data::model::{ClassMapping, MetadataTable};
use crate::data::scanner::load_metadata;
use crate::dataset::DatasetKind;
use crate::error::Result;

/// Scan the LASPI gearbox dataset, downloading it when `data_dir` is `None`.
pub fn load_laspi_metadata(data_dir: Option<&Path>) -> Result<(MetadataTable, ClassMapping)> {
    load_metadata(data_dir, DatasetKind::Laspi)
}

/// `(files, rows, 7)` features and class labels.
pub fn load_laspi_data(metadata: &MetadataTable) -> Result<(Array3<f64>, Array1<usize>)> {
    load_arrays_as(metadata, DatasetKind::Laspi)
}

pub fn load_split_laspi_data(train: &MetadataTable, test: &MetadataTable) -> Result<SplitArrays> {
    load_split_arrays_as(train, test, DatasetKind::Laspi)
}
