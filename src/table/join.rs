use std::collections::HashMap;

use super::{ColumnData, Table};
use crate::error::{Error, Result};

fn key_column(t: &Table, name: &str, side: &str) -> Result<Vec<Option<i64>>> {
    t.column(name)
        .ok_or_else(|| Error::structural(format!("{side} table has no join column `{name}`")))?
        .as_keys()
        .map_err(|e| Error::structural(format!("{side} join column `{name}`: {e}")))
}

/// Left outer join of `right` into `left` on `left[left_key] == right[right_key]`.
///
/// The rows of `left` are kept as they are, in the same order; every column
/// of `right` is appended, null where no right row matches. A key occurring
/// more than once in `right` fails with [`Error::JoinAmbiguity`] rather than
/// duplicating left rows. Null keys never match.
pub fn left_join(
    left: &mut Table,
    left_key: &str,
    right: Table,
    right_key: &str,
    name: &str,
) -> Result<()> {
    if let Some(c) = right.names().find(|c| left.contains(c)) {
        return Err(Error::structural(format!(
            "{name}: column `{c}` already exists"
        )));
    }

    let mut index: HashMap<i64, usize> = HashMap::with_capacity(right.nrows());

    for (i, k) in key_column(&right, right_key, "right")?.iter().enumerate() {
        if let Some(k) = k {
            if index.insert(*k, i).is_some() {
                return Err(Error::JoinAmbiguity {
                    overlay: name.to_string(),
                    key: *k,
                });
            }
        }
    }

    let rows: Vec<Option<usize>> = key_column(left, left_key, "left")?
        .into_iter()
        .map(|k| k.and_then(|k| index.get(&k).copied()))
        .collect();

    log::debug!(
        "{name}: {} of {} rows matched",
        rows.iter().flatten().count(),
        rows.len()
    );

    for c in right.columns {
        let data: ColumnData = c.data.take(&rows);
        left.push(c.name, data)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn ints(v: &[i64]) -> ColumnData {
        ColumnData::Int(v.iter().copied().map(Some).collect())
    }

    fn primary() -> Table {
        let mut t = Table::new(3);
        t.push("reach_id", ints(&[1, 2, 3])).unwrap();
        t
    }

    #[test]
    fn unmatched_rows_are_null() {
        let mut right = Table::new(2);
        right.push("grdc_reach_id", ints(&[2, 5])).unwrap();
        right.push("value", ints(&[9, 8])).unwrap();

        let mut left = primary();
        left_join(&mut left, "reach_id", right, "grdc_reach_id", "grdc").unwrap();

        assert_eq!(left.nrows(), 3);
        assert_eq!(
            left.column("value").unwrap(),
            &ColumnData::Int(vec![None, Some(9), None])
        );
        assert_eq!(left.value("grdc_reach_id", 1), Some(Value::Int(2)));
        assert_eq!(left.value("reach_id", 2), Some(Value::Int(3)));
    }

    #[test]
    fn empty_right() {
        let mut right = Table::new(0);
        right.push("grdc_reach_id", ints(&[])).unwrap();
        right.push("grdc_q", ColumnData::Float(vec![])).unwrap();

        let mut left = primary();
        left_join(&mut left, "reach_id", right, "grdc_reach_id", "grdc").unwrap();

        assert_eq!(left.nrows(), 3);
        assert!((0..3).all(|r| left.value("grdc_q", r).unwrap().is_null()));
    }

    #[test]
    fn duplicate_keys() {
        let mut right = Table::new(2);
        right.push("grdc_reach_id", ints(&[2, 2])).unwrap();

        let mut left = primary();
        assert!(matches!(
            left_join(&mut left, "reach_id", right, "grdc_reach_id", "grdc"),
            Err(Error::JoinAmbiguity { key: 2, .. })
        ));
    }

    #[test]
    fn float_keys_join() {
        let mut right = Table::new(3);
        right
            .push("grdc_reach_id", ColumnData::Float(vec![2.0, f64::NAN, 3.0]))
            .unwrap();
        right.push("value", ints(&[9, 8, 7])).unwrap();

        let mut left = primary();
        left_join(&mut left, "reach_id", right, "grdc_reach_id", "grdc").unwrap();

        assert_eq!(
            left.column("value").unwrap(),
            &ColumnData::Int(vec![None, Some(9), Some(7)])
        );
    }

    #[test]
    fn missing_key_column() {
        let right = Table::new(0);
        let mut left = primary();
        assert!(matches!(
            left_join(&mut left, "reach_id", right, "grdc_reach_id", "grdc"),
            Err(Error::StructuralMismatch(_))
        ));
    }
}
