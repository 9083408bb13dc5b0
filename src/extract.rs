//! Extraction of the variables aligned with an entity dimension.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::select::Mask;
use crate::source::{GroupRef, Source, ValueKind};
use crate::table::{ColumnData, Table};

/// How extracted variables are named in the resulting table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Naming {
    /// Keep the variable name.
    Raw,
    /// Always prefix: `wse` becomes `model_wse`.
    Prefix(String),
    /// Prefix unless the name already mentions the namespace: `reach_id`
    /// becomes `grdc_reach_id`, `grdc_q` stays `grdc_q`.
    Namespace(String),
}

impl Naming {
    pub fn apply(&self, name: &str) -> String {
        match self {
            Naming::Raw => name.to_string(),
            Naming::Namespace(ns) if name.contains(ns.as_str()) => name.to_string(),
            Naming::Prefix(p) | Naming::Namespace(p) => format!("{p}_{name}"),
        }
    }
}

/// Columns extracted from one group, and the variables that were left out.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub table: Table,
    pub unextracted: Vec<String>,
}

impl Extraction {
    #[must_use]
    pub fn namespaced(self, naming: &Naming) -> Extraction {
        Extraction {
            table: self.table.rename(|n| naming.apply(n)),
            unextracted: self.unextracted,
        }
    }
}

/// Extract every variable of `group` declared over exactly `(dimension,)`,
/// gathered with `mask`.
///
/// Variables in `exclude` are ignored. Variables with any other dimensions
/// (or an unsupported element type) are listed in
/// [`Extraction::unextracted`] and never read. The table has one column per
/// extracted variable and `mask.count()` rows.
pub fn extract<S: Source>(
    group: &GroupRef<'_, S>,
    dimension: &str,
    mask: &Mask,
    exclude: &[String],
) -> Result<Extraction> {
    let mut table = Table::new(mask.count());
    let mut unextracted = Vec::new();

    for var in group.variables()? {
        if exclude.contains(&var.name) {
            continue;
        }

        if !var.is_aligned(dimension) {
            log::debug!("{}: skipping {} {:?}", group.path(), var.name, var.dimensions);
            unextracted.push(var.name);
            continue;
        }

        if var.kind == ValueKind::Unsupported {
            log::warn!(
                "{}: {} has an unsupported type, not extracted",
                group.path(),
                var.name
            );
            unextracted.push(var.name);
            continue;
        }

        let n = match var.shape.as_slice() {
            [n] => *n,
            shape => {
                return Err(Error::structural(format!(
                    "{}: {} is declared over ({dimension},) but has shape {shape:?}",
                    group.path(),
                    var.name
                )))
            }
        };

        if n != mask.len() {
            return Err(Error::structural(format!(
                "{}: {} has {n} entries along `{dimension}`, expected {}",
                group.path(),
                var.name,
                mask.len()
            )));
        }

        let values = group.read(&var.name)?.select(mask)?;
        table.push(var.name, ColumnData::try_from(values)?)?;
    }

    log::info!(
        "{} variables extracted in {} group",
        table.ncols(),
        group.path()
    );

    Ok(Extraction { table, unextracted })
}
