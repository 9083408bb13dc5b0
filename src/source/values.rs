use ndarray::{Array, Array1, Array2, ArrayD, IxDyn};

use crate::error::{Error, Result};
use crate::select::Mask;

/// Element type of a variable as declared in the container.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ValueKind {
    Int,
    Float,
    Str,
    /// Compound, vlen, opaque or char variables. These are never extracted.
    Unsupported,
}

/// The values of a variable, as returned by a [`Source`](super::Source).
///
/// Values are missing-aware: sources hand them out already passed through
/// [`Values::fill_missing`], so downstream code never has to check for fill
/// values. Integer arrays that contain missing entries are promoted to
/// floating point with `NaN` in place of the missing entries.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Int(ArrayD<i64>),
    Float(ArrayD<f64>),
    Str(ArrayD<String>),
}

fn int_missing(v: i64, missing: &[f64]) -> bool {
    missing.iter().any(|m| m.fract() == 0.0 && *m as i64 == v)
}

fn float_missing(v: f64, missing: &[f64]) -> bool {
    missing.iter().any(|m| *m == v)
}

fn integral(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0
}

impl Values {
    /// A zero-dimensional floating point value.
    pub fn scalar(v: f64) -> Values {
        Values::Float(Array::from_elem(IxDyn(&[]), v))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Values::Int(_) => ValueKind::Int,
            Values::Float(_) => ValueKind::Float,
            Values::Str(_) => ValueKind::Str,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Values::Int(a) => a.shape(),
            Values::Float(a) => a.shape(),
            Values::Str(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every entry equal to one of the `missing` sentinels with `NaN`.
    ///
    /// Running this on already filled values is a no-op, `NaN` never compares
    /// equal to a sentinel.
    pub fn fill_missing(self, missing: &[f64]) -> Values {
        if missing.is_empty() {
            return self;
        }

        match self {
            Values::Float(mut a) => {
                a.mapv_inplace(|v| if float_missing(v, missing) { f64::NAN } else { v });
                Values::Float(a)
            }
            Values::Int(a) => {
                if a.iter().any(|v| int_missing(*v, missing)) {
                    Values::Float(a.mapv(|v| {
                        if int_missing(v, missing) {
                            f64::NAN
                        } else {
                            v as f64
                        }
                    }))
                } else {
                    Values::Int(a)
                }
            }
            s @ Values::Str(_) => s,
        }
    }

    /// Values as floating point. Strings can not be converted.
    pub fn to_f64(&self) -> Result<ArrayD<f64>> {
        match self {
            Values::Int(a) => Ok(a.mapv(|v| v as f64)),
            Values::Float(a) => Ok(a.clone()),
            Values::Str(_) => Err(Error::structural("expected numeric values, found strings")),
        }
    }

    /// Values as integers. Floating point values are accepted when every
    /// value is integral (some files store identifiers as doubles).
    pub fn to_i64(&self) -> Result<ArrayD<i64>> {
        match self {
            Values::Int(a) => Ok(a.clone()),
            Values::Float(a) if a.iter().all(|v| integral(*v)) => Ok(a.mapv(|v| v as i64)),
            Values::Float(_) => Err(Error::structural(
                "expected integer values, found non-integral or missing values",
            )),
            Values::Str(_) => Err(Error::structural("expected integer values, found strings")),
        }
    }

    /// One dimensional integer values, e.g. an identifier variable.
    pub fn ids(&self) -> Result<Vec<i64>> {
        ensure_1d(self)?;
        Ok(self.to_i64()?.iter().copied().collect())
    }

    /// One dimensional identifiers where missing entries (`NaN` after
    /// [`Values::fill_missing`]) are `None`.
    pub fn nullable_ids(&self) -> Result<Vec<Option<i64>>> {
        ensure_1d(self)?;

        match self {
            Values::Int(a) => Ok(a.iter().map(|v| Some(*v)).collect()),
            Values::Float(a) => a
                .iter()
                .map(|v| match *v {
                    v if v.is_nan() => Ok(None),
                    v if integral(v) => Ok(Some(v as i64)),
                    v => Err(Error::structural(format!(
                        "expected integer identifiers, found {v}"
                    ))),
                })
                .collect(),
            Values::Str(_) => Err(Error::structural("expected integer values, found strings")),
        }
    }

    /// One dimensional floating point values.
    pub fn floats(&self) -> Result<Vec<f64>> {
        ensure_1d(self)?;
        Ok(self.to_f64()?.iter().copied().collect())
    }

    /// The single value of a scalar (or one element) variable.
    pub fn scalar_f64(&self) -> Result<f64> {
        match self.len() {
            1 => Ok(self.to_f64()?.iter().copied().next().unwrap_or(f64::NAN)),
            n => Err(Error::structural(format!(
                "expected a single value, found {n} values"
            ))),
        }
    }

    /// Gather the entries of a one dimensional array where `mask` is set.
    pub fn select(&self, mask: &Mask) -> Result<Values> {
        ensure_1d(self)?;

        if self.len() != mask.len() {
            return Err(Error::structural(format!(
                "array of length {} does not match selection of length {}",
                self.len(),
                mask.len()
            )));
        }

        Ok(match self {
            Values::Int(a) => Values::Int(Array1::from(mask.gather(a.iter())).into_dyn()),
            Values::Float(a) => Values::Float(Array1::from(mask.gather(a.iter())).into_dyn()),
            Values::Str(a) => Values::Str(Array1::from(mask.gather(a.iter())).into_dyn()),
        })
    }
}

fn ensure_1d(v: &Values) -> Result<()> {
    if v.ndim() == 1 {
        Ok(())
    } else {
        Err(Error::structural(format!(
            "expected one dimensional values, found shape {:?}",
            v.shape()
        )))
    }
}

impl From<Vec<i64>> for Values {
    fn from(v: Vec<i64>) -> Self {
        Values::Int(Array1::from(v).into_dyn())
    }
}

impl From<Vec<f64>> for Values {
    fn from(v: Vec<f64>) -> Self {
        Values::Float(Array1::from(v).into_dyn())
    }
}

impl From<Vec<String>> for Values {
    fn from(v: Vec<String>) -> Self {
        Values::Str(Array1::from(v).into_dyn())
    }
}

impl From<Vec<&str>> for Values {
    fn from(v: Vec<&str>) -> Self {
        v.into_iter().map(String::from).collect::<Vec<_>>().into()
    }
}

impl From<Array2<i64>> for Values {
    fn from(a: Array2<i64>) -> Self {
        Values::Int(a.into_dyn())
    }
}

impl From<Array2<f64>> for Values {
    fn from(a: Array2<f64>) -> Self {
        Values::Float(a.into_dyn())
    }
}

impl From<ArrayD<i64>> for Values {
    fn from(a: ArrayD<i64>) -> Self {
        Values::Int(a)
    }
}

impl From<ArrayD<f64>> for Values {
    fn from(a: ArrayD<f64>) -> Self {
        Values::Float(a)
    }
}
