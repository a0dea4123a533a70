use log::{debug, info};
use ndarray::{s, Array1, Array3, Axis};
use serde::Serialize;

use super::model::{MetadataTable, Source};
use super::reader::read_tabular;
use crate::dataset::DatasetKind;
use crate::error::{Error, Result};
use crate::progress;

/// Train/test feature and label arrays sharing one row length.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitArrays {
    pub x_train: Array3<f64>,
    pub y_train: Array1<usize>,
    pub x_test: Array3<f64>,
    pub y_test: Array1<usize>,
}

/// Shapes of a [`SplitArrays`], handy for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitShapes {
    pub x_train: (usize, usize, usize),
    pub x_test: (usize, usize, usize),
}

impl SplitArrays {
    pub fn shapes(&self) -> SplitShapes {
        SplitShapes {
            x_train: self.x_train.dim(),
            x_test: self.x_test.dim(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Stack every file of `table` into `(files, min_rows, columns)`.
///
/// Files are read in table order and all truncated to the smallest row
/// count of the batch. The label array holds the rows' class indices.
pub fn load_arrays(table: &MetadataTable) -> Result<(Array3<f64>, Array1<usize>)> {
    load_arrays_as(table, table.kind)
}

/// Like [`load_arrays`] but validates column counts against `kind`.
pub fn load_arrays_as(
    table: &MetadataTable,
    kind: DatasetKind,
) -> Result<(Array3<f64>, Array1<usize>)> {
    if table.is_empty() {
        return Err(Error::EmptyMetadata);
    }
    let num_cols = kind.config().num_columns;

    // Pass 1: read and validate everything.
    let pb = progress::file_bar(table.len());
    let mut matrices = Vec::with_capacity(table.len());
    for row in &table.rows {
        let path = match &row.source {
            Source::File(path) => path,
            Source::Directory(path) => return Err(Error::DirectoryRow(path.clone())),
        };
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }

        let matrix = read_tabular(path)?;
        let actual = matrix.ncols();
        if actual != num_cols {
            return Err(Error::ColumnMismatch {
                path: path.clone(),
                expected: num_cols,
                actual,
            });
        }
        debug!("{}: {} rows", path.display(), matrix.nrows());
        matrices.push(matrix);
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Pass 2: truncate uniformly to the global minimum.
    let min_rows = matrices.iter().map(|m| m.nrows()).min().unwrap_or(0);
    let mut data = Array3::<f64>::zeros((matrices.len(), min_rows, num_cols));
    for (mut slot, matrix) in data.axis_iter_mut(Axis(0)).zip(&matrices) {
        slot.assign(&matrix.slice(s![..min_rows, ..]));
    }

    info!(
        "{kind}: loaded {} files, {} rows x {} columns each",
        matrices.len(),
        min_rows,
        num_cols
    );
    Ok((data, Array1::from_vec(table.labels())))
}

/// Load `train` and `test` independently, then cut both to the shorter
/// row length so they can be fed to the same model.
pub fn load_split_arrays(train: &MetadataTable, test: &MetadataTable) -> Result<SplitArrays> {
    load_split_arrays_as(train, test, train.kind)
}

pub fn load_split_arrays_as(
    train: &MetadataTable,
    test: &MetadataTable,
    kind: DatasetKind,
) -> Result<SplitArrays> {
    let (x_train, y_train) = load_arrays_as(train, kind)?;
    let (x_test, y_test) = load_arrays_as(test, kind)?;

    let min_rows = x_train.len_of(Axis(1)).min(x_test.len_of(Axis(1)));
    Ok(SplitArrays {
        x_train: x_train.slice(s![.., ..min_rows, ..]).to_owned(),
        y_train,
        x_test: x_test.slice(s![.., ..min_rows, ..]).to_owned(),
        y_test,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fmt::Write as _;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::data::model::MetadataRow;

    fn write_csv(path: &Path, rows: usize, cols: usize, offset: f64) {
        let mut text = (0..cols).map(|c| format!("c{c}")).collect::<Vec<_>>().join(",");
        text.push('\n');
        for r in 0..rows {
            let line = (0..cols)
                .map(|c| (offset + (r * cols + c) as f64).to_string())
                .collect::<Vec<_>>()
                .join(",");
            writeln!(text, "{line}").unwrap();
        }
        std::fs::write(path, text).unwrap();
    }

    fn file_row(path: PathBuf, class: usize) -> MetadataRow {
        MetadataRow {
            case: format!("case{class}"),
            conditions: BTreeMap::new(),
            source: Source::File(path),
            class,
        }
    }

    #[test]
    fn truncates_to_global_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        let c = dir.path().join("c.csv");
        write_csv(&a, 10, 7, 0.0);
        write_csv(&b, 8, 7, 100.0);
        write_csv(&c, 12, 7, 1000.0);

        let table = MetadataTable::new(
            DatasetKind::Laspi,
            vec![file_row(a, 0), file_row(b, 0), file_row(c, 1)],
        );
        let (x, y) = load_arrays(&table).unwrap();

        assert_eq!(x.dim(), (3, 8, 7));
        assert_eq!(y.to_vec(), vec![0, 0, 1]);
        assert_eq!(x[[0, 0, 0]], 0.0);
        assert_eq!(x[[1, 7, 6]], 100.0 + 55.0);
        assert_eq!(x[[2, 1, 0]], 1007.0);
    }

    #[test]
    fn column_mismatch_fails_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let bad = dir.path().join("bad.csv");
        write_csv(&good, 5, 11, 0.0);
        write_csv(&bad, 5, 10, 0.0);

        let table = MetadataTable::new(
            DatasetKind::AmpereRotor,
            vec![file_row(good, 0), file_row(bad.clone(), 1)],
        );
        let err = load_arrays(&table).unwrap_err();
        match err {
            Error::ColumnMismatch {
                path,
                expected,
                actual,
            } => {
                assert_eq!(path, bad);
                assert_eq!(expected, 11);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_and_directory_rows_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let table = MetadataTable::new(DatasetKind::Laspi, vec![file_row(missing.clone(), 0)]);
        assert!(matches!(load_arrays(&table), Err(Error::FileNotFound(p)) if p == missing));

        let mut row = file_row(dir.path().to_path_buf(), 0);
        row.source = Source::Directory(dir.path().to_path_buf());
        let table = MetadataTable::new(DatasetKind::MetallicadourDrifts, vec![row]);
        assert!(matches!(load_arrays(&table), Err(Error::DirectoryRow(_))));
    }

    #[test]
    fn unsupported_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        std::fs::write(&path, "[]").unwrap();
        let table = MetadataTable::new(DatasetKind::Laspi, vec![file_row(path, 0)]);
        assert!(matches!(load_arrays(&table), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn empty_table_is_an_error() {
        let table = MetadataTable::new(DatasetKind::Laspi, Vec::new());
        assert!(matches!(load_arrays(&table), Err(Error::EmptyMetadata)));
    }

    #[test]
    fn split_arrays_share_row_length() {
        let dir = tempfile::tempdir().unwrap();
        let rows = [(20, 0), (15, 1), (9, 0), (30, 1)];
        let mut file_rows = Vec::new();
        for (i, (n, class)) in rows.iter().enumerate() {
            let p = dir.path().join(format!("f{i}.csv"));
            write_csv(&p, *n, 7, 0.0);
            file_rows.push(file_row(p, *class));
        }
        let test_rows = file_rows.split_off(2);
        let train = MetadataTable::new(DatasetKind::Laspi, file_rows);
        let test = MetadataTable::new(DatasetKind::Laspi, test_rows);

        let split = load_split_arrays(&train, &test).unwrap();
        assert_eq!(split.shapes().x_train, (2, 9, 7));
        assert_eq!(split.shapes().x_test, (2, 9, 7));
        assert_eq!(split.y_train.to_vec(), vec![0, 1]);
        assert_eq!(split.y_test.to_vec(), vec![0, 1]);
    }
}
