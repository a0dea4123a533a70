use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetKind;
use crate::error::{Error, Result};

pub const CASE_COLUMN: &str = "Case";
pub const FILEPATH_COLUMN: &str = "Filepath";
pub const CLASS_COLUMN: &str = "class";

// ---------------------------------------------------------------------------
// MetadataValue – a single cell in a metadata column
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata cell.
/// Used as a `BTreeMap` key when grouping, so it must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

// -- Manual Eq/Ord so floats can take part in group keys --

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use MetadataValue::*;
        fn rank(v: &MetadataValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
            }
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Null => Ok(()),
        }
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Integer(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::String(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// Source – what a metadata row points at
// ---------------------------------------------------------------------------

/// Where the measurements of one row live.
///
/// Standard and tool-wear scans record one row per data file; the drifts
/// scan records one row per subcase directory, which the drifts facade
/// later expands into file rows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Source {
    File(PathBuf),
    Directory(PathBuf),
}

impl Source {
    pub fn path(&self) -> &Path {
        match self {
            Source::File(p) | Source::Directory(p) => p,
        }
    }
}

// ---------------------------------------------------------------------------
// MetadataRow / MetadataTable
// ---------------------------------------------------------------------------

/// One row of metadata: a case label, its parsed conditions and a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub case: String,
    /// Condition columns keyed by column name (e.g. `Speed` → 1500).
    pub conditions: BTreeMap<String, MetadataValue>,
    pub source: Source,
    /// Class index of `case` in the scan's [`ClassMapping`].
    pub class: usize,
}

impl MetadataRow {
    /// Look a column up by name, including the fixed `Case`, `Filepath`
    /// and `class` columns.
    pub fn get(&self, column: &str) -> Option<MetadataValue> {
        match column {
            CASE_COLUMN => Some(MetadataValue::String(self.case.clone())),
            FILEPATH_COLUMN => Some(MetadataValue::String(
                self.source.path().display().to_string(),
            )),
            CLASS_COLUMN => Some(MetadataValue::Integer(self.class as i64)),
            other => self.conditions.get(other).cloned(),
        }
    }
}

/// An ordered collection of rows sharing the schema of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataTable {
    pub kind: DatasetKind,
    pub rows: Vec<MetadataRow>,
}

impl MetadataTable {
    pub fn new(kind: DatasetKind, rows: Vec<MetadataRow>) -> Self {
        MetadataTable { kind, rows }
    }

    /// `Case`, the dataset's condition columns, `Filepath`, `class`.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut cols = vec![CASE_COLUMN];
        cols.extend_from_slice(self.kind.config().condition_columns);
        cols.push(FILEPATH_COLUMN);
        cols.push(CLASS_COLUMN);
        cols
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().iter().any(|c| *c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn labels(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.class).collect()
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| Error::write(path, e))?;
        let columns = self.columns();
        writer
            .write_record(&columns)
            .map_err(|e| Error::write(path, e))?;
        for row in &self.rows {
            let record: Vec<String> = columns
                .iter()
                .map(|col| row.get(col).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            writer
                .write_record(&record)
                .map_err(|e| Error::write(path, e))?;
        }
        writer.flush().map_err(|e| Error::write(path, e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ClassMapping
// ---------------------------------------------------------------------------

/// Bijection between class indices and case labels, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMapping {
    labels: Vec<String>,
}

impl ClassMapping {
    /// Assign indices to the distinct labels of `cases` in order of first
    /// appearance and return the index of every input element.
    pub fn factorize<'a, I>(cases: I) -> (Self, Vec<usize>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mapping = ClassMapping::default();
        let codes = cases.into_iter().map(|c| mapping.assign(c)).collect();
        (mapping, codes)
    }

    /// Index of `label`, registering it with the next free index if unseen.
    pub fn assign(&mut self, label: &str) -> usize {
        match self.index_of(label) {
            Some(idx) => idx,
            None => {
                self.labels.push(label.to_string());
                self.labels.len() - 1
            }
        }
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().map(String::as_str).enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(case: &str, speed: i64, path: &str) -> MetadataRow {
        let mut conditions = BTreeMap::new();
        conditions.insert("Speed".to_string(), MetadataValue::Integer(speed));
        MetadataRow {
            case: case.to_string(),
            conditions,
            source: Source::File(PathBuf::from(path)),
            class: 0,
        }
    }

    #[test]
    fn factorize_uses_first_seen_order() {
        let (mapping, codes) = ClassMapping::factorize(["B", "A", "B", "C", "A"]);
        assert_eq!(codes, vec![0, 1, 0, 2, 1]);
        assert_eq!(mapping.label(0), Some("B"));
        assert_eq!(mapping.label(2), Some("C"));
        assert_eq!(mapping.index_of("A"), Some(1));
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn assign_extends_mapping() {
        let (mut mapping, _) = ClassMapping::factorize(["healthy"]);
        assert_eq!(mapping.assign("healthy"), 0);
        assert_eq!(mapping.assign("drift"), 1);
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![(0, "healthy"), (1, "drift")]);
    }

    #[test]
    fn row_column_lookup() {
        let r = row("Bearing", 1500, "/tmp/a.csv");
        assert_eq!(r.get("Case"), Some(MetadataValue::from("Bearing")));
        assert_eq!(r.get("Speed"), Some(MetadataValue::Integer(1500)));
        assert_eq!(r.get("Filepath"), Some(MetadataValue::from("/tmp/a.csv")));
        assert_eq!(r.get("class"), Some(MetadataValue::Integer(0)));
        assert_eq!(r.get("Load"), None);
    }

    #[test]
    fn columns_follow_dataset_schema() {
        let table = MetadataTable::new(DatasetKind::MetallicadourToolwear, Vec::new());
        assert_eq!(
            table.columns(),
            vec!["Case", "Cutting_Depth", "Feed_Rate", "Speed", "Filepath", "class"]
        );
        let drifts = MetadataTable::new(DatasetKind::MetallicadourDrifts, Vec::new());
        assert_eq!(drifts.columns(), vec!["Case", "Type", "Filepath", "class"]);
    }

    #[test]
    fn metadata_values_order_by_type_then_value() {
        let mut values = vec![
            MetadataValue::from("b"),
            MetadataValue::Integer(3),
            MetadataValue::Null,
            MetadataValue::Float(0.5),
            MetadataValue::Integer(-1),
            MetadataValue::from("a"),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                MetadataValue::Null,
                MetadataValue::Integer(-1),
                MetadataValue::Integer(3),
                MetadataValue::Float(0.5),
                MetadataValue::from("a"),
                MetadataValue::from("b"),
            ]
        );
    }

    #[test]
    fn write_csv_emits_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("meta.csv");
        let table = MetadataTable::new(DatasetKind::Laspi, vec![row("A", 1500, "x.csv")]);
        table.write_csv(&out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Case,Speed_Frequency,Load_Percent,Speed,Filepath,class")
        );
        assert_eq!(lines.next(), Some("A,,,1500,x.csv,0"));
    }

    #[test]
    fn write_csv_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing/meta.csv");
        let table = MetadataTable::new(DatasetKind::Laspi, vec![row("A", 1500, "x.csv")]);
        let err = table.write_csv(&out).unwrap_err();
        assert!(matches!(&err, Error::Write { path, .. } if *path == out));
        assert!(err.to_string().starts_with("error while writing"));
    }
}
