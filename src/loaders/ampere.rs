use std::path::Path;

use ndarray::{Array1, Array3};

use crate::data::loader::{load_arrays_as, load_split_arrays_as, SplitArrays};
use crate::data::model::{ClassMapping, MetadataTable};
use crate::data::scanner::load_metadata;
use crate::dataset::DatasetKind;
use crate::error::Result;

// Rotor and stator data ship in the same archive; whichever is requested
// first downloads both.

pub fn load_ampere_rotor_metadata(
    data_dir: Option<&Path>,
) -> Result<(MetadataTable, ClassMapping)> {
    load_metadata(data_dir, DatasetKind::AmpereRotor)
}

pub fn load_ampere_stator_metadata(
    data_dir: Option<&Path>,
) -> Result<(MetadataTable, ClassMapping)> {
    load_metadata(data_dir, DatasetKind::AmpereStator)
}

pub fn load_ampere_rotor_data(metadata: &MetadataTable) -> Result<(Array3<f64>, Array1<usize>)> {
    load_arrays_as(metadata, DatasetKind::AmpereRotor)
}

pub fn load_ampere_stator_data(metadata: &MetadataTable) -> Result<(Array3<f64>, Array1<usize>)> {
    load_arrays_as(metadata, DatasetKind::AmpereStator)
}

pub fn load_split_ampere_rotor_data(
    train: &MetadataTable,
    test: &MetadataTable,
) -> Result<SplitArrays> {
    load_split_arrays_as(train, test, DatasetKind::AmpereRotor)
}

pub fn load_split_ampere_stator_data(
    train: &MetadataTable,
    test: &MetadataTable,
) -> Result<SplitArrays> {
    load_split_arrays_as(train, test, DatasetKind::AmpereStator)
}
