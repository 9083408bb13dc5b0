//! NetCDF4 (HDF5) files through the netCDF C library.

use ndarray::{ArrayD, IxDyn};
use netcdf::types::NcVariableType;
use netcdf::AttributeValue;
use std::path::{Path, PathBuf};

use super::values::{ValueKind, Values};
use super::{missing_group, missing_variable, Attribute, GroupPath, Source, VariableInfo};
use crate::error::{Error, Result};

const MISSING_ATTRIBUTES: [&str; 2] = ["_FillValue", "missing_value"];

fn source_err(e: netcdf::Error) -> Error {
    Error::Source(e.to_string())
}

/// A NetCDF4 file opened read-only.
pub struct NcSource {
    file: netcdf::File,
    path: PathBuf,
}

impl NcSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<NcSource> {
        let path = path.as_ref();
        log::debug!("opening {path:?}");

        let file = netcdf::open(path)
            .map_err(|e| Error::Source(format!("failed to open {path:?}: {e}")))?;

        Ok(NcSource {
            file,
            path: path.into(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` on the group at `path`, `None` if there is no such group.
    fn visit<R, F>(&self, path: &GroupPath, f: F) -> Result<Option<R>>
    where
        F: FnOnce(Scope<'_, '_>) -> Result<R>,
    {
        match path.components().split_first() {
            None => f(Scope::Root(&self.file)).map(Some),
            Some((head, rest)) => match self.file.group(head).map_err(source_err)? {
                Some(g) => descend(&g, rest, f),
                None => Ok(None),
            },
        }
    }

    fn visit_existing<R, F>(&self, path: &GroupPath, f: F) -> Result<R>
    where
        F: FnOnce(Scope<'_, '_>) -> Result<R>,
    {
        self.visit(path, f)?.ok_or_else(|| missing_group(path))
    }
}

impl std::fmt::Debug for NcSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NcSource").field("path", &self.path).finish()
    }
}

fn descend<R, F>(g: &netcdf::Group<'_>, path: &[String], f: F) -> Result<Option<R>>
where
    F: FnOnce(Scope<'_, '_>) -> Result<R>,
{
    match path.split_first() {
        None => f(Scope::Group(g)).map(Some),
        Some((head, rest)) => match g.group(head) {
            Some(child) => descend(&child, rest, f),
            None => Ok(None),
        },
    }
}

/// The root group is the file itself in the netCDF API.
enum Scope<'a, 'f> {
    Root(&'a netcdf::File),
    Group(&'a netcdf::Group<'f>),
}

impl Scope<'_, '_> {
    fn infos(&self) -> Vec<VariableInfo> {
        match self {
            Scope::Root(f) => f.variables().map(|v| info(&v)).collect(),
            Scope::Group(g) => g.variables().map(|v| info(&v)).collect(),
        }
    }

    fn read(&self, name: &str) -> Option<Result<Values>> {
        match self {
            Scope::Root(f) => f.variable(name).map(|v| read(&v)),
            Scope::Group(g) => g.variable(name).map(|v| read(&v)),
        }
    }

    fn group_names(&self) -> Result<Vec<String>> {
        Ok(match self {
            Scope::Root(f) => f.groups().map_err(source_err)?.map(|g| g.name()).collect(),
            Scope::Group(g) => g.groups().map(|g| g.name()).collect(),
        })
    }

    fn attribute(&self, name: &str) -> Result<Option<Attribute>> {
        let a = match self {
            Scope::Root(f) => f.attribute(name),
            Scope::Group(g) => g.attribute(name),
        };

        match a {
            Some(a) => Ok(attribute(a.value().map_err(source_err)?)),
            None => Ok(None),
        }
    }
}

fn kind(v: &netcdf::Variable) -> ValueKind {
    match v.vartype() {
        NcVariableType::Int(_) => ValueKind::Int,
        NcVariableType::Float(_) => ValueKind::Float,
        NcVariableType::String => ValueKind::Str,
        _ => ValueKind::Unsupported,
    }
}

fn info(v: &netcdf::Variable) -> VariableInfo {
    VariableInfo {
        name: v.name(),
        dimensions: v.dimensions().iter().map(|d| d.name()).collect(),
        shape: v.dimensions().iter().map(|d| d.len()).collect(),
        kind: kind(v),
    }
}

fn attribute(v: AttributeValue) -> Option<Attribute> {
    use AttributeValue::*;

    Some(match v {
        Str(s) => Attribute::Str(s),
        Strs(s) => Attribute::Str(s.join(",")),
        Schar(v) => Attribute::Int(v.into()),
        Uchar(v) => Attribute::Int(v.into()),
        Short(v) => Attribute::Int(v.into()),
        Ushort(v) => Attribute::Int(v.into()),
        Int(v) => Attribute::Int(v.into()),
        Uint(v) => Attribute::Int(v.into()),
        Longlong(v) => Attribute::Int(v),
        Shorts(v) => Attribute::Ints(v.into_iter().map(i64::from).collect()),
        Ints(v) => Attribute::Ints(v.into_iter().map(i64::from).collect()),
        Longlongs(v) => Attribute::Ints(v),
        Float(v) => Attribute::Float(v.into()),
        Double(v) => Attribute::Float(v),
        Floats(v) => Attribute::Floats(v.into_iter().map(f64::from).collect()),
        Doubles(v) => Attribute::Floats(v),
        _ => return None,
    })
}

/// Sentinels marking missing values of a variable.
fn missing_values(v: &netcdf::Variable) -> Result<Vec<f64>> {
    let mut missing = Vec::new();

    for name in MISSING_ATTRIBUTES {
        if let Some(a) = v.attribute(name) {
            if let Some(a) = attribute(a.value().map_err(source_err)?) {
                missing.extend(a.as_f64s());
            }
        }
    }

    Ok(missing)
}

fn to_array<T>(shape: &[usize], values: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|e| Error::structural(e.to_string()))
}

fn read(v: &netcdf::Variable) -> Result<Values> {
    let shape: Vec<usize> = v.dimensions().iter().map(|d| d.len()).collect();

    let values = match kind(v) {
        ValueKind::Int => Values::Int(to_array(
            &shape,
            v.get_values::<i64, _>(..).map_err(source_err)?,
        )?),
        ValueKind::Float => Values::Float(to_array(
            &shape,
            v.get_values::<f64, _>(..).map_err(source_err)?,
        )?),
        ValueKind::Str => {
            let strings = match shape.len() {
                0 => vec![v.get_string(..).map_err(source_err)?],
                1 => (0..shape[0])
                    .map(|i| v.get_string([i]).map_err(source_err))
                    .collect::<Result<Vec<_>>>()?,
                _ => {
                    return Err(Error::structural(format!(
                        "{}: multi-dimensional string variables are not supported",
                        v.name()
                    )))
                }
            };
            Values::Str(to_array(&shape, strings)?)
        }
        ValueKind::Unsupported => {
            return Err(Error::structural(format!(
                "{}: unsupported variable type",
                v.name()
            )))
        }
    };

    Ok(values.fill_missing(&missing_values(v)?))
}

impl Source for NcSource {
    fn contains_group(&self, path: &GroupPath) -> Result<bool> {
        Ok(self.visit(path, |_| Ok(()))?.is_some())
    }

    fn group_names(&self, path: &GroupPath) -> Result<Vec<String>> {
        self.visit_existing(path, |s| s.group_names())
    }

    fn variables(&self, path: &GroupPath) -> Result<Vec<VariableInfo>> {
        self.visit_existing(path, |s| Ok(s.infos()))
    }

    fn read(&self, path: &GroupPath, name: &str) -> Result<Values> {
        self.visit_existing(path, |s| {
            s.read(name)
                .unwrap_or_else(|| Err(missing_variable(path, name)))
        })
    }

    fn attribute(&self, path: &GroupPath, name: &str) -> Result<Option<Attribute>> {
        self.visit_existing(path, |s| s.attribute(name))
    }
}
