use std::collections::BTreeMap;

use log::debug;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::model::{MetadataRow, MetadataTable, MetadataValue, CASE_COLUMN};
use crate::error::{Error, Result};

/// Default proportion of each group sent to the test side.
pub const DEFAULT_TEST_SIZE: f64 = 0.25;
/// Default shuffle seed.
pub const DEFAULT_SEED: u64 = 42;

/// Group key: `Case` value followed by the extra grouping columns' values.
type GroupKey = Vec<MetadataValue>;

/// Split `table` into train and test tables, stratified by `Case` plus
/// any columns in `group_by`.
///
/// Groups are visited in sorted key order. Each group is shuffled with a
/// generator seeded from `seed`, `ceil(test_size * n)` rows go to the test
/// side and the rest to train. A group too small for `test_size` can end
/// up with an empty train side.
pub fn split_metadata(
    table: &MetadataTable,
    group_by: &[&str],
    test_size: f64,
    seed: u64,
) -> Result<(MetadataTable, MetadataTable)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::InvalidTestSize(test_size));
    }

    let invalid: Vec<String> = group_by
        .iter()
        .filter(|col| !table.has_column(col))
        .map(|col| col.to_string())
        .collect();
    if !invalid.is_empty() {
        return Err(Error::InvalidGroupColumns(invalid));
    }

    let mut columns = vec![CASE_COLUMN];
    columns.extend(group_by.iter().copied().filter(|c| *c != CASE_COLUMN));

    let mut groups: BTreeMap<GroupKey, Vec<&MetadataRow>> = BTreeMap::new();
    for row in &table.rows {
        let key = columns
            .iter()
            .map(|col| row.get(col).unwrap_or(MetadataValue::Null))
            .collect();
        groups.entry(key).or_default().push(row);
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for (key, rows) in &groups {
        let (group_train, group_test) = split_group(rows, test_size, seed);
        debug!(
            "group {key:?}: {} train / {} test",
            group_train.len(),
            group_test.len()
        );
        train.extend(group_train);
        test.extend(group_test);
    }

    Ok((
        MetadataTable::new(table.kind, train),
        MetadataTable::new(table.kind, test),
    ))
}

fn split_group(
    rows: &[&MetadataRow],
    test_size: f64,
    seed: u64,
) -> (Vec<MetadataRow>, Vec<MetadataRow>) {
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((test_size * rows.len() as f64).ceil() as usize).min(rows.len());
    let (test_idx, train_idx) = indices.split_at(n_test);

    let pick = |idx: &[usize]| -> Vec<MetadataRow> {
        idx.iter().map(|&i| rows[i].clone()).collect()
    };
    (pick(train_idx), pick(test_idx))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;
    use crate::data::model::Source;
    use crate::dataset::DatasetKind;

    fn table() -> MetadataTable {
        let mut rows = Vec::new();
        for (class, case) in ["Healthy", "Bearing", "Gear"].iter().enumerate() {
            for speed in [1500i64, 3000] {
                for i in 0..8 {
                    let mut conditions = BTreeMap::new();
                    conditions.insert("Speed_Frequency".into(), MetadataValue::Integer(speed / 30));
                    conditions.insert("Load_Percent".into(), MetadataValue::Integer(50));
                    conditions.insert("Speed".into(), MetadataValue::Integer(speed));
                    rows.push(MetadataRow {
                        case: case.to_string(),
                        conditions,
                        source: Source::File(PathBuf::from(format!("{case}/{speed}/{i}.csv"))),
                        class,
                    });
                }
            }
        }
        MetadataTable::new(DatasetKind::Laspi, rows)
    }

    fn paths(t: &MetadataTable) -> Vec<PathBuf> {
        t.rows.iter().map(|r| r.source.path().to_path_buf()).collect()
    }

    #[test]
    fn same_seed_same_partition() {
        let t = table();
        let (a_train, a_test) = split_metadata(&t, &["Speed"], 0.25, 7).unwrap();
        let (b_train, b_test) = split_metadata(&t, &["Speed"], 0.25, 7).unwrap();
        assert_eq!(a_train, b_train);
        assert_eq!(a_test, b_test);
    }

    #[test]
    fn partition_covers_input_without_overlap() {
        let t = table();
        let (train, test) = split_metadata(&t, &[], 0.25, 42).unwrap();

        let mut all: Vec<PathBuf> = paths(&train).into_iter().chain(paths(&test)).collect();
        all.sort();
        let mut expected = paths(&t);
        expected.sort();
        assert_eq!(all, expected);

        // 3 groups of 16 rows: ceil(0.25 * 16) = 4 test rows each.
        assert_eq!(test.len(), 12);
        assert_eq!(train.len(), 36);
    }

    #[test]
    fn every_group_contributes_to_both_sides() {
        let t = table();
        let (train, test) = split_metadata(&t, &["Speed"], 0.25, 1).unwrap();
        for side in [&train, &test] {
            for case in ["Healthy", "Bearing", "Gear"] {
                for speed in [1500, 3000] {
                    assert!(side.rows.iter().any(|r| r.case == case
                        && r.get("Speed") == Some(MetadataValue::Integer(speed))));
                }
            }
        }
        // ceil(0.25 * 8) = 2 per (case, speed) group.
        assert_eq!(test.len(), 12);
    }

    #[test]
    fn groups_are_emitted_in_sorted_order() {
        let t = table();
        let (train, _) = split_metadata(&t, &[], 0.5, 3).unwrap();
        let cases: Vec<&str> = train.rows.iter().map(|r| r.case.as_str()).collect();
        let mut sorted = cases.clone();
        sorted.sort();
        assert_eq!(cases, sorted);
        assert_eq!(cases.first(), Some(&"Bearing"));
    }

    #[test]
    fn invalid_group_column_is_named() {
        let err = split_metadata(&table(), &["Speed", "Torque"], 0.25, 42).unwrap_err();
        assert!(matches!(err, Error::InvalidGroupColumns(cols) if cols == vec!["Torque".to_string()]));
    }

    #[test]
    fn test_size_out_of_range() {
        assert!(matches!(
            split_metadata(&table(), &[], 1.0, 42),
            Err(Error::InvalidTestSize(_))
        ));
        assert!(matches!(
            split_metadata(&table(), &[], 0.0, 42),
            Err(Error::InvalidTestSize(_))
        ));
    }

    #[test]
    fn singleton_group_goes_to_test() {
        let mut t = table();
        t.rows.truncate(1);
        let (train, test) = split_metadata(&t, &[], 0.25, 42).unwrap();
        assert!(train.is_empty());
        assert_eq!(test.len(), 1);
    }
}
