//! SWOT observation files in the Confluence layout (`<reach_id>_SWOT.nc`).

use ndarray::{Array1, Array2, Ix1, Ix2};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::source::{GroupRef, Session, Source};

const TIME: &str = "nt";
const SUFFIX: &str = "_SWOT.nc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationLevel {
    Reach,
    Node,
}

impl ObservationLevel {
    pub fn group(&self) -> &'static str {
        match self {
            ObservationLevel::Reach => "reach",
            ObservationLevel::Node => "node",
        }
    }
}

/// Values of an observed variable. Missing observations are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Scalar(f64),
    /// Along `nt`.
    Time(Array1<f64>),
    /// Entity by `nt` (node files).
    Grid(Array2<f64>),
}

impl Series {
    /// The time series, if this is one.
    pub fn as_time(&self) -> Option<&Array1<f64>> {
        match self {
            Series::Time(a) => Some(a),
            _ => None,
        }
    }
}

/// Read an observed variable: a scalar, a time series along `nt`, or a
/// per-entity time series. Anything else is a structural mismatch.
pub fn load_series<S: Source>(group: &GroupRef<'_, S>, name: &str) -> Result<Series> {
    let info = group.variable_info(name)?;
    let dims: Vec<&str> = info.dimensions.iter().map(String::as_str).collect();

    let wrong = || {
        Error::structural(format!(
            "{}: wrong dimensions for {name}: {dims:?}",
            group.path()
        ))
    };

    let values = group.read(name)?.to_f64()?;
    let shape_err = |e: ndarray::ShapeError| Error::structural(e.to_string());

    match dims.as_slice() {
        [] => Ok(Series::Scalar(values.iter().copied().next().unwrap_or(f64::NAN))),
        [TIME] => Ok(Series::Time(values.into_dimensionality::<Ix1>().map_err(shape_err)?)),
        [_, TIME] => Ok(Series::Grid(values.into_dimensionality::<Ix2>().map_err(shape_err)?)),
        _ => Err(wrong()),
    }
}

/// Observations of one SWOT file.
#[derive(Debug, Clone)]
pub struct Observations {
    pub level: ObservationLevel,
    pub wse: Series,
    pub width: Series,
    pub d_x_area: Series,
    /// Only at reach level.
    pub slope2: Option<Series>,
    pub extra: Vec<(String, Series)>,
}

impl Observations {
    /// Load the default variables and `extra` from the level group.
    pub fn load<S: Source>(
        session: &Session<S>,
        level: ObservationLevel,
        extra: &[&str],
    ) -> Result<Observations> {
        let group = session.group(level.group())?;

        Ok(Observations {
            level,
            wse: load_series(&group, "wse")?,
            width: load_series(&group, "width")?,
            d_x_area: load_series(&group, "d_x_area")?,
            slope2: match level {
                ObservationLevel::Reach => Some(load_series(&group, "slope2")?),
                ObservationLevel::Node => None,
            },
            extra: extra
                .iter()
                .map(|n| load_series(&group, n).map(|s| (n.to_string(), s)))
                .collect::<Result<_>>()?,
        })
    }

    /// Slope used downstream: `slope2`.
    pub fn slope(&self) -> Option<&Series> {
        self.slope2.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        match name {
            "wse" => Some(&self.wse),
            "width" => Some(&self.width),
            "d_x_area" => Some(&self.d_x_area),
            "slope2" | "slope" => self.slope2.as_ref(),
            _ => self.extra.iter().find(|(n, _)| n == name).map(|(_, s)| s),
        }
    }
}

/// A directory of SWOT observation files.
#[derive(Debug, Clone)]
pub struct ObservationCollection {
    dir: PathBuf,
    files: Vec<String>,
}

impl ObservationCollection {
    /// List the `*_SWOT.nc` files of `dir`, sorted by name.
    pub fn scan<P: AsRef<Path>>(dir: P) -> Result<ObservationCollection> {
        let dir = dir.as_ref();

        let mut files = std::fs::read_dir(dir)?
            .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
            .filter(|n| n.as_ref().map_or(true, |n| n.ends_with(SUFFIX)))
            .collect::<std::io::Result<Vec<_>>>()?;
        files.sort();

        log::debug!("{} observation files in {dir:?}", files.len());

        Ok(ObservationCollection {
            dir: dir.into(),
            files,
        })
    }

    /// File names, without directory.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn path(&self, i: usize) -> Option<PathBuf> {
        self.files.get(i).map(|f| self.dir.join(f))
    }

    /// Reach identifiers, the file name up to the first `_`.
    pub fn reaches(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(|f| f.split('_').next().unwrap_or(f))
            .collect()
    }

    /// Reach identifiers as numbers.
    pub fn reach_ids(&self) -> Result<Vec<i64>> {
        self.reaches()
            .into_iter()
            .map(|r| {
                r.parse().map_err(|_| {
                    Error::Configuration(format!("`{r}` is not a numeric reach identifier"))
                })
            })
            .collect()
    }
}
