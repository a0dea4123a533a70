use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use super::model::{ClassMapping, MetadataRow, MetadataTable, MetadataValue, Source};
use super::naming::SubcaseMatch;
use crate::archive::{ArchiveProvider, HttpArchiveProvider};
use crate::dataset::DatasetKind;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Scan a dataset tree into a metadata table and its class mapping.
///
/// Without `data_dir` the dataset is fetched into `<cwd>/data` first.
pub fn load_metadata(
    data_dir: Option<&Path>,
    kind: DatasetKind,
) -> Result<(MetadataTable, ClassMapping)> {
    scan_metadata(&HttpArchiveProvider::default(), data_dir, kind)
}

/// Like [`load_metadata`] but resolves a missing `data_dir` through `provider`.
pub fn scan_metadata<P: ArchiveProvider + ?Sized>(
    provider: &P,
    data_dir: Option<&Path>,
    kind: DatasetKind,
) -> Result<(MetadataTable, ClassMapping)> {
    let root = match data_dir {
        Some(dir) if dir.exists() => dir.to_path_buf(),
        Some(dir) => return Err(Error::PathNotFound(dir.to_path_buf())),
        None => provider.resolve(kind)?,
    };

    let mut rows = Vec::new();
    for case_dir in subdirectories(&root)? {
        let case_name = file_name(&case_dir);
        for subcase_dir in subdirectories(&case_dir)? {
            scan_subcase(kind, &case_name, &subcase_dir, &mut rows)?;
        }
    }

    let (classes, codes) = ClassMapping::factorize(rows.iter().map(|r| r.case.as_str()));
    for (row, class) in rows.iter_mut().zip(codes) {
        row.class = class;
    }
    debug!(
        "{kind}: {} metadata rows, {} classes",
        rows.len(),
        classes.len()
    );
    Ok((MetadataTable::new(kind, rows), classes))
}

/// Build a metadata table from every `*.{extension}` file found
/// recursively under `dirs`.
///
/// Labels come from the directory layout rather than folder-name patterns:
/// the case is the file's grandparent directory and `Type` its
/// great-grandparent. Class indices are taken from `classes`, which is
/// extended with any label it does not know yet. Missing directories are
/// skipped.
pub fn augment_from_glob(
    dirs: &[PathBuf],
    extension: &str,
    kind: DatasetKind,
    classes: &mut ClassMapping,
) -> Result<MetadataTable> {
    let mut rows = Vec::new();
    for dir in dirs.iter().filter(|d| d.is_dir()) {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::read(dir, e))?;
            if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                files.push(entry.into_path());
            }
        }

        for file in files {
            let case = ancestor_name(&file, 2);
            let fault_type = ancestor_name(&file, 3);
            let mut conditions = BTreeMap::new();
            conditions.insert("Type".to_string(), MetadataValue::String(fault_type));
            rows.push(MetadataRow {
                class: classes.assign(&case),
                case,
                conditions,
                source: Source::File(file),
            });
        }
    }
    Ok(MetadataTable::new(kind, rows))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn scan_subcase(
    kind: DatasetKind,
    case_name: &str,
    subcase_dir: &Path,
    rows: &mut Vec<MetadataRow>,
) -> Result<()> {
    let config = kind.config();
    let subcase_name = file_name(subcase_dir);

    match config.pattern.parse(&subcase_name) {
        Some(SubcaseMatch::Conditions(values)) => {
            let conditions: BTreeMap<String, MetadataValue> = config
                .condition_columns
                .iter()
                .zip(values)
                .map(|(col, v)| (col.to_string(), MetadataValue::Integer(v)))
                .collect();

            for path in sorted_entries(subcase_dir)? {
                if !path.is_file() {
                    continue;
                }
                if has_extension(&path, config.extension) {
                    rows.push(MetadataRow {
                        case: case_name.to_string(),
                        conditions: conditions.clone(),
                        source: Source::File(path),
                        class: 0,
                    });
                } else {
                    warn!(
                        "The file {} is excluded. It is not in the required format .{}",
                        file_name(&path),
                        config.extension
                    );
                }
            }
        }
        Some(SubcaseMatch::Drift { axes }) => {
            debug!("{subcase_name}: {} drifted axes", axes.len());
            let mut conditions = BTreeMap::new();
            conditions.insert(
                "Type".to_string(),
                MetadataValue::String(case_name.to_string()),
            );
            rows.push(MetadataRow {
                case: subcase_name,
                conditions,
                source: Source::Directory(subcase_dir.to_path_buf()),
                class: 0,
            });
        }
        None => {
            warn!(
                "Folder {subcase_name} does not match the format: {}",
                config.pattern.describe()
            );
        }
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Name of the `level`-th ancestor (1 = parent directory).
fn ancestor_name(path: &Path, level: usize) -> String {
    path.ancestors()
        .nth(level)
        .map(file_name)
        .unwrap_or_default()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == extension)
}
