//! Access to hierarchical containers (groups of named, dimensioned variables).
//!
//! A container is only reachable through a [`Session`], which owns it and
//! releases it exactly once, either through [`Session::close`] or when the
//! session is dropped. Groups are addressed by [`GroupPath`] and handed out as
//! [`GroupRef`]s borrowing the session, so the container can not be released
//! while a group is in use.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

pub mod memory;
pub mod values;
#[cfg(feature = "netcdf")]
pub mod nc;

pub use memory::{MemoryGroup, MemorySource, MemoryVariable};
#[cfg(feature = "netcdf")]
pub use nc::NcSource;
pub use values::{ValueKind, Values};

/// Path of a group from the root, e.g. `model/grdc`. The empty path is the root.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupPath(Vec<String>);

impl GroupPath {
    pub fn root() -> GroupPath {
        GroupPath(Vec::new())
    }

    /// Path of the child group `name`.
    #[must_use]
    pub fn join(&self, name: &str) -> GroupPath {
        let mut p = self.0.clone();
        p.push(name.to_string());
        GroupPath(p)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Name of the last component, empty for the root.
    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for GroupPath {
    fn from(s: &str) -> Self {
        GroupPath(
            s.split('/')
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
        )
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

/// Description of a variable, available without reading its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    pub name: String,
    pub dimensions: Vec<String>,
    pub shape: Vec<usize>,
    pub kind: ValueKind,
}

impl VariableInfo {
    /// Is the variable declared over exactly `(dimension,)`.
    pub fn is_aligned(&self, dimension: &str) -> bool {
        self.dimensions.len() == 1 && self.dimensions[0] == dimension
    }
}

/// Value of a group attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Str(String),
    Int(i64),
    Float(f64),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

impl Attribute {
    /// Numeric attribute values as floating point (e.g. fill values).
    pub fn as_f64s(&self) -> Vec<f64> {
        match self {
            Attribute::Str(_) => Vec::new(),
            Attribute::Int(v) => vec![*v as f64],
            Attribute::Float(v) => vec![*v],
            Attribute::Ints(v) => v.iter().map(|v| *v as f64).collect(),
            Attribute::Floats(v) => v.clone(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Str(s) => write!(f, "{s}"),
            Attribute::Int(v) => write!(f, "{v}"),
            Attribute::Float(v) => write!(f, "{v}"),
            Attribute::Ints(v) => write!(f, "{v:?}"),
            Attribute::Floats(v) => write!(f, "{v:?}"),
        }
    }
}

/// A read-only hierarchical container.
///
/// Implementations must return [`Values`] with missing entries already
/// replaced (see [`Values::fill_missing`]). Asking for a group that does not
/// exist, other than through [`Source::contains_group`], is a
/// [`Error::StructuralMismatch`].
pub trait Source {
    fn contains_group(&self, path: &GroupPath) -> Result<bool>;

    /// Names of the sub-groups of `path`, in container order.
    fn group_names(&self, path: &GroupPath) -> Result<Vec<String>>;

    /// Variables of the group at `path`, in container order.
    fn variables(&self, path: &GroupPath) -> Result<Vec<VariableInfo>>;

    /// Read all values of a variable.
    fn read(&self, path: &GroupPath, name: &str) -> Result<Values>;

    /// Attribute of the group at `path`, `None` if it is not set.
    fn attribute(&self, path: &GroupPath, name: &str) -> Result<Option<Attribute>>;
}

pub(crate) fn missing_group(path: &GroupPath) -> Error {
    Error::structural(format!("missing group {path}"))
}

pub(crate) fn missing_variable(path: &GroupPath, name: &str) -> Error {
    Error::structural(format!("missing variable `{name}` in group {path}"))
}

/// An open container. Owns the source until it is closed or dropped.
pub struct Session<S: Source> {
    source: Option<S>,
}

impl<S: Source> Session<S> {
    pub fn new(source: S) -> Session<S> {
        Session {
            source: Some(source),
        }
    }

    /// The underlying container, as long as the session is open.
    pub fn source(&self) -> Result<&S> {
        self.source.as_ref().ok_or(Error::ClosedContainer)
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Release the container. Returns `false` if it was already released.
    pub fn close(&mut self) -> bool {
        match self.source.take() {
            Some(source) => {
                drop(source);
                log::debug!("container released");
                true
            }
            None => false,
        }
    }

    pub fn root(&self) -> Result<GroupRef<'_, S>> {
        self.source()?;

        Ok(GroupRef {
            session: self,
            path: GroupPath::root(),
        })
    }

    /// The group at `path`, which must exist.
    pub fn group<P: Into<GroupPath>>(&self, path: P) -> Result<GroupRef<'_, S>> {
        let path = path.into();

        if self.source()?.contains_group(&path)? {
            Ok(GroupRef {
                session: self,
                path,
            })
        } else {
            Err(missing_group(&path))
        }
    }

    /// The group at `path`, or `None` if the container does not have it.
    pub fn try_group<P: Into<GroupPath>>(&self, path: P) -> Result<Option<GroupRef<'_, S>>> {
        let path = path.into();

        Ok(self
            .source()?
            .contains_group(&path)?
            .then(|| GroupRef {
                session: self,
                path,
            }))
    }

    /// Direct access to any variable, including the ones a load does not extract.
    pub fn variable<P: Into<GroupPath>>(&self, path: P, name: &str) -> Result<Values> {
        self.group(path)?.read(name)
    }
}

impl<S: Source> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.is_open())
            .finish()
    }
}

/// A group of an open session.
pub struct GroupRef<'s, S: Source> {
    session: &'s Session<S>,
    path: GroupPath,
}

impl<'s, S: Source> GroupRef<'s, S> {
    pub fn path(&self) -> &GroupPath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn variables(&self) -> Result<Vec<VariableInfo>> {
        self.session.source()?.variables(&self.path)
    }

    pub fn variable_info(&self, name: &str) -> Result<VariableInfo> {
        self.variables()?
            .into_iter()
            .find(|v| v.name == name)
            .ok_or_else(|| missing_variable(&self.path, name))
    }

    pub fn read(&self, name: &str) -> Result<Values> {
        log::debug!("reading {}/{}", self.path, name);
        self.session.source()?.read(&self.path, name)
    }

    pub fn group_names(&self) -> Result<Vec<String>> {
        self.session.source()?.group_names(&self.path)
    }

    pub fn group(&self, name: &str) -> Result<GroupRef<'s, S>> {
        self.session.group(self.path.join(name))
    }

    pub fn try_group(&self, name: &str) -> Result<Option<GroupRef<'s, S>>> {
        self.session.try_group(self.path.join(name))
    }

    pub fn attribute(&self, name: &str) -> Result<Option<Attribute>> {
        self.session.source()?.attribute(&self.path, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session<MemorySource> {
        Session::new(
            MemorySource::new().group(
                "model",
                MemoryGroup::new()
                    .variable(MemoryVariable::new("q", &["num_reaches"], vec![1.0, 2.0]))
                    .group("grdc", MemoryGroup::new()),
            ),
        )
    }

    #[test]
    fn paths() {
        let p = GroupPath::from("model/grdc");
        assert_eq!(p.components(), ["model", "grdc"]);
        assert_eq!(p.name(), "grdc");
        assert_eq!(p.to_string(), "/model/grdc");
        assert_eq!(GroupPath::from("model").join("grdc"), p);
        assert!(GroupPath::from("").is_root());
    }

    #[test]
    fn groups() {
        let s = session();
        let model = s.group("model").unwrap();
        assert_eq!(model.group_names().unwrap(), ["grdc"]);
        assert_eq!(model.group("grdc").unwrap().name(), "grdc");
        assert!(model.try_group("usgs").unwrap().is_none());
        assert!(matches!(
            s.group("reaches"),
            Err(Error::StructuralMismatch(_))
        ));
    }

    #[test]
    fn direct_variable_access() {
        let s = session();
        let q = s.variable("model", "q").unwrap();
        assert_eq!(q.floats().unwrap(), [1.0, 2.0]);
        assert!(s.variable("model", "wse").is_err());
    }

    #[test]
    fn closed_session() {
        let mut s = session();
        assert!(s.close());
        assert!(!s.close());
        assert!(!s.is_open());
        assert!(matches!(s.group("model"), Err(Error::ClosedContainer)));
        assert!(matches!(s.root(), Err(Error::ClosedContainer)));
        assert!(matches!(
            s.variable("model", "q"),
            Err(Error::ClosedContainer)
        ));
    }
}
