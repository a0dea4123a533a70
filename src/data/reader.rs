use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use ndarray::Array2;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read one measurement file as a `(rows, columns)` matrix. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`             – header row, then numeric cells
/// * `.xlsx` / `.xls`   – first worksheet, header row, then numeric cells
/// * `.parquet` / `.pq` – every column cast to `Float64`
///
/// Empty cells become `NaN`.
pub fn read_tabular(path: &Path) -> Result<Array2<f64>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xls" => read_spreadsheet(path),
        "parquet" | "pq" => read_parquet(path),
        _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<Array2<f64>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::read(path, e))?;
    let num_cols = reader.headers().map_err(|e| Error::read(path, e))?.len();

    let mut values = Vec::new();
    let mut num_rows = 0;
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::read(path, format!("row {row_no}: {e}")))?;
        for (col, cell) in record.iter().enumerate() {
            values.push(parse_cell(cell).ok_or_else(|| {
                Error::read(path, format!("row {row_no}, column {col}: '{cell}' is not a number"))
            })?);
        }
        num_rows += 1;
    }

    to_matrix(path, num_rows, num_cols, values)
}

fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

fn read_spreadsheet(path: &Path) -> Result<Array2<f64>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::read(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::read(path, "workbook has no worksheet"))?
        .map_err(|e| Error::read(path, e))?;

    let num_cols = range.width();
    let mut values = Vec::new();
    let mut num_rows = 0;
    // First row is the header.
    for (row_no, row) in range.rows().skip(1).enumerate() {
        for (col, cell) in row.iter().enumerate() {
            let value = match cell {
                Data::Empty => Some(f64::NAN),
                other => other.as_f64(),
            };
            values.push(value.ok_or_else(|| {
                Error::read(path, format!("row {row_no}, column {col}: {cell:?} is not a number"))
            })?);
        }
        num_rows += 1;
    }

    to_matrix(path, num_rows, num_cols, values)
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn read_parquet(path: &Path) -> Result<Array2<f64>> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::read(path, format!("reading parquet metadata: {e}")))?;
    let num_cols = builder.schema().fields().len();
    let reader = builder
        .build()
        .map_err(|e| Error::read(path, format!("building parquet reader: {e}")))?;

    let mut values = Vec::new();
    let mut num_rows = 0;
    for batch_result in reader {
        let batch = batch_result.map_err(|e| Error::read(path, e))?;
        let columns = batch
            .columns()
            .iter()
            .map(|col| cast(col, &DataType::Float64))
            .collect::<std::result::Result<Vec<ArrayRef>, _>>()
            .map_err(|e| Error::read(path, e))?;

        for row in 0..batch.num_rows() {
            for col in &columns {
                let floats = col.as_primitive::<Float64Type>();
                values.push(if floats.is_null(row) {
                    f64::NAN
                } else {
                    floats.value(row)
                });
            }
        }
        num_rows += batch.num_rows();
    }

    to_matrix(path, num_rows, num_cols, values)
}

fn to_matrix(path: &Path, rows: usize, cols: usize, values: Vec<f64>) -> Result<Array2<f64>> {
    Array2::from_shape_vec((rows, cols), values).map_err(|e| Error::read(path, e))
}
