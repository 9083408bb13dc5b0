//! An in-memory container, built programmatically.
//!
//! Useful for datasets assembled from other sources and for tests. Fill values
//! are applied when variables are read, in the same way as for files.

use std::cell::RefCell;

use super::values::Values;
use super::{missing_group, missing_variable, Attribute, GroupPath, Source, VariableInfo};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct MemoryVariable {
    name: String,
    dimensions: Vec<String>,
    values: Values,
    missing: Vec<f64>,
}

impl MemoryVariable {
    /// A variable over `dimensions`. The rank of `values` is not checked
    /// against the dimension names here; a mismatch surfaces as a
    /// structural error when the variable is extracted.
    pub fn new<V: Into<Values>>(name: &str, dimensions: &[&str], values: V) -> MemoryVariable {
        let values = values.into();

        MemoryVariable {
            name: name.to_string(),
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            values,
            missing: Vec::new(),
        }
    }

    /// A zero-dimensional variable.
    pub fn scalar(name: &str, v: f64) -> MemoryVariable {
        MemoryVariable::new(name, &[], Values::scalar(v))
    }

    /// Set the `_FillValue` of the variable.
    #[must_use]
    pub fn fill_value(mut self, fill: f64) -> MemoryVariable {
        self.missing.push(fill);
        self
    }

    fn info(&self) -> VariableInfo {
        VariableInfo {
            name: self.name.clone(),
            dimensions: self.dimensions.clone(),
            shape: self.values.shape().to_vec(),
            kind: self.values.kind(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryGroup {
    variables: Vec<MemoryVariable>,
    groups: Vec<(String, MemoryGroup)>,
    attributes: Vec<(String, Attribute)>,
}

impl MemoryGroup {
    pub fn new() -> MemoryGroup {
        MemoryGroup::default()
    }

    #[must_use]
    pub fn variable(mut self, v: MemoryVariable) -> MemoryGroup {
        self.variables.retain(|o| o.name != v.name);
        self.variables.push(v);
        self
    }

    #[must_use]
    pub fn group(mut self, name: &str, g: MemoryGroup) -> MemoryGroup {
        self.groups.retain(|(n, _)| n != name);
        self.groups.push((name.to_string(), g));
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: &str, a: Attribute) -> MemoryGroup {
        self.attributes.retain(|(n, _)| n != name);
        self.attributes.push((name.to_string(), a));
        self
    }

    fn child(&self, name: &str) -> Option<&MemoryGroup> {
        self.groups.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }
}

/// Container held entirely in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    root: MemoryGroup,

    /// Variables read so far, as `path/name`.
    reads: RefCell<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    pub fn with_root(root: MemoryGroup) -> MemorySource {
        MemorySource {
            root,
            reads: RefCell::default(),
        }
    }

    /// Add a variable to the root group.
    #[must_use]
    pub fn variable(mut self, v: MemoryVariable) -> MemorySource {
        self.root = self.root.variable(v);
        self
    }

    /// Add a group to the root group.
    #[must_use]
    pub fn group(mut self, name: &str, g: MemoryGroup) -> MemorySource {
        self.root = self.root.group(name, g);
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: &str, a: Attribute) -> MemorySource {
        self.root = self.root.attribute(name, a);
        self
    }

    /// Every variable read from this source, in order, as `/group/name`.
    pub fn reads(&self) -> Vec<String> {
        self.reads.borrow().clone()
    }

    fn resolve(&self, path: &GroupPath) -> Option<&MemoryGroup> {
        path.components()
            .iter()
            .try_fold(&self.root, |g, name| g.child(name))
    }

    fn group_at(&self, path: &GroupPath) -> Result<&MemoryGroup> {
        self.resolve(path).ok_or_else(|| missing_group(path))
    }
}

impl Source for MemorySource {
    fn contains_group(&self, path: &GroupPath) -> Result<bool> {
        Ok(self.resolve(path).is_some())
    }

    fn group_names(&self, path: &GroupPath) -> Result<Vec<String>> {
        Ok(self
            .group_at(path)?
            .groups
            .iter()
            .map(|(n, _)| n.clone())
            .collect())
    }

    fn variables(&self, path: &GroupPath) -> Result<Vec<VariableInfo>> {
        Ok(self
            .group_at(path)?
            .variables
            .iter()
            .map(MemoryVariable::info)
            .collect())
    }

    fn read(&self, path: &GroupPath, name: &str) -> Result<Values> {
        let v = self
            .group_at(path)?
            .variables
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| missing_variable(path, name))?;

        let p = if path.is_root() {
            format!("/{name}")
        } else {
            format!("{path}/{name}")
        };
        self.reads.borrow_mut().push(p);

        Ok(v.values.clone().fill_missing(&v.missing))
    }

    fn attribute(&self, path: &GroupPath, name: &str) -> Result<Option<Attribute>> {
        Ok(self
            .group_at(path)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::source::ValueKind;

    fn source() -> MemorySource {
        MemorySource::new()
            .attribute("status", Attribute::Str("ok".into()))
            .group(
                "reaches",
                MemoryGroup::new()
                    .variable(MemoryVariable::new("reach_id", &["num_reaches"], vec![1i64, 2]))
                    .variable(
                        MemoryVariable::new("wse", &["num_reaches"], vec![1.5, -9999.0])
                            .fill_value(-9999.0),
                    ),
            )
    }

    #[test]
    fn variables_in_order() {
        let s = source();
        let vars = s.variables(&"reaches".into()).unwrap();
        let names: Vec<_> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["reach_id", "wse"]);
        assert_eq!(vars[0].kind, ValueKind::Int);
        assert_eq!(vars[1].shape, [2]);
        assert!(vars[1].is_aligned("num_reaches"));
    }

    #[test]
    fn read_fills_missing() {
        let s = source();
        let wse = s.read(&"reaches".into(), "wse").unwrap().floats().unwrap();
        assert_eq!(wse[0], 1.5);
        assert!(wse[1].is_nan());
        assert_eq!(s.reads(), ["/reaches/wse"]);
    }

    #[test]
    fn missing_things() {
        let s = source();
        assert!(!s.contains_group(&"nodes".into()).unwrap());
        assert!(matches!(
            s.read(&"reaches".into(), "width"),
            Err(Error::StructuralMismatch(_))
        ));
        assert!(matches!(
            s.variables(&"nodes".into()),
            Err(Error::StructuralMismatch(_))
        ));
    }

    #[test]
    fn attributes() {
        let s = source();
        assert_eq!(
            Source::attribute(&s, &GroupPath::root(), "status").unwrap(),
            Some(Attribute::Str("ok".into()))
        );
        assert_eq!(Source::attribute(&s, &GroupPath::root(), "other").unwrap(), None);
    }
}
