use std::path::{Path, PathBuf};

use log::info;
use ndarray::{Array1, Array3};
use serde::Serialize;

use crate::data::loader::{load_arrays_as, load_split_arrays_as, SplitArrays};
use crate::data::model::{ClassMapping, MetadataTable};
use crate::data::scanner::{augment_from_glob, load_metadata};
use crate::dataset::{DatasetKind, METALLICADOUR_POSITION_PATH, METALLICADOUR_TOOL_PATH};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Tool wear
// ---------------------------------------------------------------------------

pub fn load_toolwear_metadata(data_dir: Option<&Path>) -> Result<(MetadataTable, ClassMapping)> {
    load_metadata(data_dir, DatasetKind::MetallicadourToolwear)
}

pub fn load_toolwear_data(metadata: &MetadataTable) -> Result<(Array3<f64>, Array1<usize>)> {
    load_arrays_as(metadata, DatasetKind::MetallicadourToolwear)
}

pub fn load_split_toolwear_data(
    train: &MetadataTable,
    test: &MetadataTable,
) -> Result<SplitArrays> {
    load_split_arrays_as(train, test, DatasetKind::MetallicadourToolwear)
}

// ---------------------------------------------------------------------------
// Positioning drifts
// ---------------------------------------------------------------------------

/// File-level metadata of the drifts dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftsMetadata {
    /// Tool measurements (`.csv`) of every drift subcase.
    pub tool: MetadataTable,
    /// Axis positions (`.xlsx`) of every drift subcase.
    pub position: MetadataTable,
    /// Shared by both tables.
    pub classes: ClassMapping,
}

/// Scan the drift subcases and expand each into its tool and position files.
pub fn load_drifts_metadata(data_dir: Option<&Path>) -> Result<DriftsMetadata> {
    let kind = DatasetKind::MetallicadourDrifts;
    let (subcases, mut classes) = load_metadata(data_dir, kind)?;

    let subcase_dirs: Vec<&Path> = subcases.rows.iter().map(|r| r.source.path()).collect();
    let under = |sub: &str| -> Vec<PathBuf> {
        subcase_dirs.iter().map(|dir| dir.join(sub)).collect()
    };

    let tool = augment_from_glob(&under(METALLICADOUR_TOOL_PATH), "csv", kind, &mut classes)?;
    let position = augment_from_glob(
        &under(METALLICADOUR_POSITION_PATH),
        "xlsx",
        kind,
        &mut classes,
    )?;
    info!(
        "drifts: {} subcases, {} tool files, {} position files",
        subcases.len(),
        tool.len(),
        position.len()
    );

    Ok(DriftsMetadata {
        tool,
        position,
        classes,
    })
}

/// Load a drifts file table (tool or position) into arrays.
pub fn load_drifts_data(metadata: &MetadataTable) -> Result<(Array3<f64>, Array1<usize>)> {
    load_arrays_as(metadata, DatasetKind::MetallicadourDrifts)
}

pub fn load_split_drifts_data(train: &MetadataTable, test: &MetadataTable) -> Result<SplitArrays> {
    load_split_arrays_as(train, test, DatasetKind::MetallicadourDrifts)
}
