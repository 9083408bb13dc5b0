//! In-memory tables: one row per entity, named and typed columns.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::source::Values;

mod join;

pub use join::left_join;

/// Column storage. Missing values are `None` for integers and strings and
/// `NaN` for floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Int(Vec<Option<i64>>),
    Float(Vec<f64>),
    Str(Vec<Option<String>>),
}

/// A single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Int(i64),
    Float(f64),
    Str(&'a str),
}

impl Value<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
        }
    }
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<Value<'_>> {
        Some(match self {
            ColumnData::Int(v) => v.get(row)?.map_or(Value::Null, Value::Int),
            ColumnData::Float(v) => {
                let v = *v.get(row)?;
                if v.is_nan() {
                    Value::Null
                } else {
                    Value::Float(v)
                }
            }
            ColumnData::Str(v) => v.get(row)?.as_deref().map_or(Value::Null, Value::Str),
        })
    }

    pub fn as_ints(&self) -> Option<&[Option<i64>]> {
        match self {
            ColumnData::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    /// The column as join keys. Floating point columns qualify when every
    /// non-null value is integral, `NaN` is a null key.
    pub fn as_keys(&self) -> Result<Vec<Option<i64>>> {
        match self {
            ColumnData::Int(v) => Ok(v.clone()),
            ColumnData::Float(v) => v
                .iter()
                .map(|v| match *v {
                    v if v.is_nan() => Ok(None),
                    v if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
                    v => Err(Error::structural(format!(
                        "{v} is not an integer key"
                    ))),
                })
                .collect(),
            ColumnData::Str(_) => Err(Error::structural("string columns are not integer keys")),
        }
    }

    /// Gather rows by position, `None` gives a null cell.
    pub fn take(&self, rows: &[Option<usize>]) -> ColumnData {
        match self {
            ColumnData::Int(v) => ColumnData::Int(
                rows.iter()
                    .map(|r| r.and_then(|r| v[r]))
                    .collect(),
            ),
            ColumnData::Float(v) => ColumnData::Float(
                rows.iter()
                    .map(|r| r.map_or(f64::NAN, |r| v[r]))
                    .collect(),
            ),
            ColumnData::Str(v) => ColumnData::Str(
                rows.iter()
                    .map(|r| r.and_then(|r| v[r].clone()))
                    .collect(),
            ),
        }
    }

    /// Minimum and maximum of the non-null values of a numeric column.
    pub fn range(&self) -> Option<(f64, f64)> {
        let values: Box<dyn Iterator<Item = f64> + '_> = match self {
            ColumnData::Int(v) => Box::new(v.iter().flatten().map(|v| *v as f64)),
            ColumnData::Float(v) => Box::new(v.iter().copied().filter(|v| !v.is_nan())),
            ColumnData::Str(_) => return None,
        };

        values.fold(None, |r, v| match r {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

impl TryFrom<Values> for ColumnData {
    type Error = Error;

    fn try_from(v: Values) -> Result<ColumnData> {
        if v.ndim() != 1 {
            return Err(Error::structural(format!(
                "only one dimensional values make a column, found shape {:?}",
                v.shape()
            )));
        }

        Ok(match v {
            Values::Int(a) => ColumnData::Int(a.iter().map(|v| Some(*v)).collect()),
            Values::Float(a) => ColumnData::Float(a.iter().copied().collect()),
            Values::Str(a) => ColumnData::Str(a.iter().map(|v| Some(v.clone())).collect()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    nrows: usize,
    columns: Vec<Column>,
}

impl Table {
    /// An empty table with `nrows` rows and no columns.
    pub fn new(nrows: usize) -> Table {
        Table {
            nrows,
            columns: Vec::new(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    pub fn value(&self, name: &str, row: usize) -> Option<Value<'_>> {
        self.column(name)?.get(row)
    }

    /// All cells of a row, in column order.
    pub fn row(&self, row: usize) -> Option<Vec<(&str, Value<'_>)>> {
        if row >= self.nrows {
            return None;
        }

        self.columns
            .iter()
            .map(|c| c.data.get(row).map(|v| (c.name.as_str(), v)))
            .collect()
    }

    /// Append a column. It must have `nrows` values and a new name.
    pub fn push<S: Into<String>>(&mut self, name: S, data: ColumnData) -> Result<()> {
        let name = name.into();

        if data.len() != self.nrows {
            return Err(Error::structural(format!(
                "column `{name}` has {} rows, table has {}",
                data.len(),
                self.nrows
            )));
        }

        if self.contains(&name) {
            return Err(Error::structural(format!("duplicate column `{name}`")));
        }

        self.columns.push(Column { name, data });
        Ok(())
    }

    /// Append all columns of `other` (same rows, side by side).
    pub fn extend(&mut self, other: Table) -> Result<()> {
        for c in other.columns {
            self.push(c.name, c.data)?;
        }
        Ok(())
    }

    /// Rename every column with `f`.
    #[must_use]
    pub fn rename<F: Fn(&str) -> String>(mut self, f: F) -> Table {
        for c in &mut self.columns {
            c.name = f(&c.name);
        }
        self
    }

    /// Rows at the given positions, in that order.
    pub fn take(&self, rows: &[usize]) -> Table {
        let idx: Vec<Option<usize>> = rows.iter().copied().map(Some).collect();

        Table {
            nrows: rows.len(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.take(&idx),
                })
                .collect(),
        }
    }

    /// Positions of the rows where integer column `name` equals `v`.
    pub fn find(&self, name: &str, v: i64) -> Result<Vec<usize>> {
        let keys = self
            .column(name)
            .ok_or_else(|| Error::structural(format!("missing column `{name}`")))?
            .as_keys()?;

        Ok(keys
            .iter()
            .enumerate()
            .filter_map(|(i, x)| (*x == Some(v)).then_some(i))
            .collect())
    }
}
