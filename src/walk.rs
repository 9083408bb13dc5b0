//! Walking the group scopes of a container into one primary table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::extract::{extract, Naming};
use crate::options::LoadOptions;
use crate::report::Report;
use crate::select::{compute_nullable_mask, Mask};
use crate::source::{GroupPath, Session, Source};
use crate::table::Table;

/// Entity level of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Reaches,
    Nodes,
}

impl Level {
    /// Entity dimension of the level.
    pub fn dimension(&self) -> &'static str {
        match self {
            Level::Reaches => "num_reaches",
            Level::Nodes => "num_nodes",
        }
    }

    /// Base group of the level.
    pub fn group(&self) -> &'static str {
        match self {
            Level::Reaches => "reaches",
            Level::Nodes => "nodes",
        }
    }

    /// Name of the level in singular, as used by per-level sub-groups
    /// (`gbpriors/reach`).
    pub fn sublevel(&self) -> &'static str {
        match self {
            Level::Reaches => "reach",
            Level::Nodes => "node",
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Level> {
        match s {
            "reaches" => Ok(Level::Reaches),
            "nodes" => Ok(Level::Nodes),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group())
    }
}

/// A group walked with the primary selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Key of the scope in the [`Report`].
    pub tag: String,
    pub path: GroupPath,
    pub naming: Naming,
    /// A missing required scope fails the walk, others are skipped.
    pub required: bool,
}

/// Result of walking the scopes of a container.
#[derive(Debug, Clone)]
pub struct Walk {
    pub table: Table,
    /// Primary selection over the entity dimension of the level.
    pub mask: Mask,
    pub report: Report,
}

/// Selection of the base group entities whose `filter_key` is in the allow-list.
pub fn primary_mask<S: Source>(session: &Session<S>, options: &LoadOptions) -> Result<Mask> {
    let base = session.group(options.level.group())?;
    let key = base.variable_info(&options.filter_key)?;

    if !key.is_aligned(options.level.dimension()) {
        return Err(Error::structural(format!(
            "{}: {} has dimensions {:?}, expected ({},)",
            base.path(),
            key.name,
            key.dimensions,
            options.level.dimension()
        )));
    }

    let ids = base.read(&options.filter_key)?.nullable_ids()?;
    compute_nullable_mask(&ids, options.reaches.as_ref())
}

/// Extract the per-entity variables of every scope into one table.
///
/// All scopes share the primary selection and the entity dimension of the
/// level. Columns are named by the scope's [`Naming`]; a name produced by two
/// scopes is a [`Error::StructuralMismatch`].
pub fn walk<S: Source>(session: &Session<S>, options: &LoadOptions) -> Result<Walk> {
    let mask = primary_mask(session, options)?;
    let dimension = options.level.dimension();

    log::debug!(
        "{}: {} of {} entities selected",
        options.level,
        mask.count(),
        mask.len()
    );

    let mut table = Table::new(mask.count());
    let mut report = Report::new();

    for scope in options.scopes() {
        let group = match session.try_group(scope.path.clone())? {
            Some(g) => g,
            None if scope.required => return Err(crate::source::missing_group(&scope.path)),
            None => {
                log::debug!("optional group {} not present", scope.path);
                continue;
            }
        };

        let e = extract(&group, dimension, &mask, &options.exclude)?.namespaced(&scope.naming);
        table.extend(e.table)?;
        report.insert(scope.tag, e.unextracted);
    }

    Ok(Walk {
        table,
        mask,
        report,
    })
}
