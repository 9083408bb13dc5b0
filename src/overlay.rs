//! Gauge overlay networks (GRDC, USGS, ...) joined onto the primary table.
//!
//! Every overlay is a sub-group of a well-known parent group (`model` in SoS
//! files) with its own identifier space: it lists the reaches it observes in
//! its own `reach_id` variable, over its own dimension (`num_grdc_reaches`).

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::extract::{extract, Naming};
use crate::options::LoadOptions;
use crate::report::Report;
use crate::select::{compute_nullable_mask, Mask};
use crate::source::{GroupPath, GroupRef, Session, Source};
use crate::table::{left_join, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// Name of the overlay group, also the namespace of its columns.
    pub name: String,
    pub path: GroupPath,
}

/// The overlays of a container: the sub-groups of `parent`, in container
/// order. A container without `parent` has no overlays.
pub fn discover<S: Source>(session: &Session<S>, parent: &GroupPath) -> Result<Vec<Overlay>> {
    let parent = match session.try_group(parent.clone())? {
        Some(p) => p,
        None => return Ok(Vec::new()),
    };

    Ok(parent
        .group_names()?
        .into_iter()
        .map(|name| Overlay {
            path: parent.path().join(&name),
            name,
        })
        .collect())
}

/// Entity dimension of an overlay: the only dimension of its `join_key` variable.
pub fn overlay_dimension<S: Source>(overlay: &GroupRef<'_, S>, join_key: &str) -> Result<String> {
    let key = overlay.variable_info(join_key)?;

    match key.dimensions.as_slice() {
        [d] => Ok(d.clone()),
        dims => Err(Error::structural(format!(
            "{}: {join_key} must be one dimensional, has dimensions {dims:?}",
            overlay.path()
        ))),
    }
}

/// Primary table with the overlay joined in.
#[derive(Debug, Clone)]
pub struct Merged {
    pub table: Table,
    pub unextracted: Vec<String>,
}

/// Join the variables of `overlay` along `dimension` into `primary`.
///
/// The overlay is filtered with its own selection computed from `allow_list`
/// against its `join_key` variable, then left joined on
/// `primary[join_key] == overlay[<namespace>_<join_key>]`. The primary rows
/// are kept as they are; overlay columns are null where the overlay does not
/// observe the entity.
pub fn merge<S: Source>(
    primary: Table,
    overlay: &GroupRef<'_, S>,
    dimension: &str,
    join_key: &str,
    allow_list: Option<&HashSet<i64>>,
    namespace: &str,
) -> Result<Merged> {
    let ids = overlay.read(join_key)?.nullable_ids()?;

    let mask = if ids.is_empty() {
        Mask::all(0)
    } else {
        compute_nullable_mask(&ids, allow_list)?
    };

    let naming = Naming::Namespace(namespace.to_string());
    let e = extract(overlay, dimension, &mask, &[])?.namespaced(&naming);

    let mut table = primary;
    left_join(
        &mut table,
        join_key,
        e.table,
        &naming.apply(join_key),
        namespace,
    )?;

    Ok(Merged {
        table,
        unextracted: e.unextracted,
    })
}

/// Allow-list applied to the overlays, in the identifier space of `join_key`.
///
/// When the primary selection was made on another key (e.g. `node_id`), the
/// overlays keep the `join_key` values of the selected primary rows.
fn overlay_allow_list(primary: &Table, options: &LoadOptions) -> Result<Option<HashSet<i64>>> {
    match &options.reaches {
        None => Ok(None),
        Some(reaches) if options.filter_key == options.join_key => Ok(Some(reaches.clone())),
        Some(_) => {
            let keys = primary
                .column(&options.join_key)
                .ok_or_else(|| {
                    Error::structural(format!(
                        "primary table has no join column `{}`",
                        options.join_key
                    ))
                })?
                .as_keys()?;

            Ok(Some(keys.into_iter().flatten().collect()))
        }
    }
}

/// Merge every overlay found under `options.overlay_parent`, in order.
pub fn merge_all<S: Source>(
    session: &Session<S>,
    primary: Table,
    options: &LoadOptions,
) -> Result<(Table, Report)> {
    let allow_list = overlay_allow_list(&primary, options)?;
    let mut table = primary;
    let mut report = Report::new();

    for o in discover(session, &options.overlay_parent)? {
        let group = session.group(o.path.clone())?;
        let dimension = overlay_dimension(&group, &options.join_key)?;

        log::debug!("merging overlay {} along {dimension}", o.path);

        let m = merge(
            table,
            &group,
            &dimension,
            &options.join_key,
            allow_list.as_ref(),
            &o.name,
        )?;

        table = m.table;
        report.insert(o.name, m.unextracted);
    }

    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemoryGroup, MemorySource, MemoryVariable};
    use crate::table::{ColumnData, Value};
    use crate::walk::Level;

    fn primary() -> Table {
        let mut t = Table::new(3);
        t.push(
            "reach_id",
            ColumnData::Int(vec![Some(1), Some(2), Some(3)]),
        )
        .unwrap();
        t
    }

    fn grdc(ids: Vec<i64>, values: Vec<i64>) -> MemoryGroup {
        MemoryGroup::new()
            .variable(MemoryVariable::new("reach_id", &["num_grdc_reaches"], ids))
            .variable(MemoryVariable::new("value", &["num_grdc_reaches"], values))
            .variable(MemoryVariable::new(
                "grdc_q",
                &["num_grdc_reaches", "num_days"],
                ndarray::Array2::<f64>::zeros((2, 4)),
            ))
    }

    fn session(g: MemoryGroup) -> Session<MemorySource> {
        Session::new(MemorySource::new().group(
            "model",
            MemoryGroup::new()
                .group("grdc", g)
                .group("usgs", MemoryGroup::new().variable(MemoryVariable::new(
                    "reach_id",
                    &["num_usgs_reaches"],
                    Vec::<i64>::new(),
                ))),
        ))
    }

    #[test]
    fn discover_overlays() {
        let s = session(grdc(vec![2, 5], vec![9, 8]));
        let o = discover(&s, &"model".into()).unwrap();
        assert_eq!(
            o.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
            ["grdc", "usgs"]
        );
        assert_eq!(o[0].path, GroupPath::from("model/grdc"));
        assert!(discover(&s, &"gbpriors".into()).unwrap().is_empty());

        let g = s.group("model/grdc").unwrap();
        assert_eq!(overlay_dimension(&g, "reach_id").unwrap(), "num_grdc_reaches");
    }

    #[test]
    fn merge_left_outer() {
        let s = session(grdc(vec![2, 5], vec![9, 8]));
        let g = s.group("model/grdc").unwrap();
        let m = merge(primary(), &g, "num_grdc_reaches", "reach_id", None, "grdc").unwrap();

        assert_eq!(
            m.table.names().collect::<Vec<_>>(),
            ["reach_id", "grdc_reach_id", "grdc_value"]
        );
        assert_eq!(
            m.table.column("grdc_value").unwrap(),
            &ColumnData::Int(vec![None, Some(9), None])
        );
        assert_eq!(m.unextracted, ["grdc_q"]);
    }

    #[test]
    fn overlay_has_own_selection() {
        let s = session(grdc(vec![2, 5], vec![9, 8]));
        let g = s.group("model/grdc").unwrap();
        let allow: HashSet<i64> = [1, 3].into_iter().collect();
        let m = merge(
            primary(),
            &g,
            "num_grdc_reaches",
            "reach_id",
            Some(&allow),
            "grdc",
        )
        .unwrap();

        assert_eq!(m.table.nrows(), 3);
        assert!((0..3).all(|r| m.table.value("grdc_value", r).unwrap().is_null()));
    }

    #[test]
    fn duplicate_overlay_keys() {
        let s = session(grdc(vec![2, 2], vec![9, 8]));
        let g = s.group("model/grdc").unwrap();
        assert!(matches!(
            merge(primary(), &g, "num_grdc_reaches", "reach_id", None, "grdc"),
            Err(Error::JoinAmbiguity { key: 2, .. })
        ));
    }

    #[test]
    fn merge_all_overlays() {
        let s = session(grdc(vec![3, 1], vec![7, 6]));
        let o = LoadOptions::new(Level::Reaches).reaches([1, 2, 3]);
        let (t, r) = merge_all(&s, primary(), &o).unwrap();

        assert_eq!(t.nrows(), 3);
        assert_eq!(t.value("grdc_value", 0), Some(Value::Int(6)));
        assert!(t.value("grdc_value", 1).unwrap().is_null());
        assert_eq!(t.value("grdc_value", 2), Some(Value::Int(7)));

        // the usgs overlay is empty: its key column is all null
        assert!((0..3).all(|i| t.value("usgs_reach_id", i).unwrap().is_null()));
        assert_eq!(r.get("grdc").unwrap(), ["grdc_q"]);
        assert_eq!(r.get("usgs").unwrap().len(), 0);
    }
}
