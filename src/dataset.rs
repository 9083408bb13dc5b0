//! Loading a complete dataset: primary table, overlays and geometry.

#[cfg(feature = "netcdf")]
use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::{self, Bounds, Polyline};
use crate::options::{LoadOptions, Product};
use crate::overlay;
use crate::report::Report;
use crate::source::{Session, Source};
use crate::table::Table;
use crate::walk::{self, Level};

/// Per-entity table of a river network file, optionally with the centerline
/// of every row.
#[derive(Debug, Clone)]
pub struct Dataset {
    level: Level,
    table: Table,
    geometries: Option<Vec<Polyline>>,
    report: Report,
}

impl Dataset {
    /// Load from an open session. The session can be closed as soon as this
    /// returns, the dataset does not refer to it.
    pub fn load<S: Source>(session: &Session<S>, options: &LoadOptions) -> Result<Dataset> {
        let walk::Walk {
            table,
            mask,
            mut report,
        } = walk::walk(session, options)?;

        let table = match options.product {
            Product::Sos => {
                let (table, overlays) = overlay::merge_all(session, table, options)?;
                for (scope, names) in overlays.scopes() {
                    report.insert(scope, names.to_vec());
                }
                table
            }
            Product::Sword => table,
        };

        let geometries = if options.geometry {
            Some(geometry::load_geometries(
                session,
                options.level,
                &mask,
                options.reject_overlapping_ranges,
            )?)
        } else {
            None
        };

        log::info!(
            "loaded {} {} with {} columns",
            table.nrows(),
            options.level,
            table.ncols()
        );

        Ok(Dataset {
            level: options.level,
            table,
            geometries,
            report,
        })
    }

    /// Open the file at `path`, load it and close it again, also on failure.
    #[cfg(feature = "netcdf")]
    pub fn open<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Dataset> {
        let mut session = Session::new(crate::source::NcSource::open(path)?);
        let ds = Dataset::load(&session, options);
        session.close();
        ds
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Centerlines, one per row of the table, if they were loaded.
    pub fn geometries(&self) -> Option<&[Polyline]> {
        self.geometries.as_deref()
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.table.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounds of all geometries.
    pub fn bounds(&self) -> Option<Bounds> {
        geometry::total_bounds(self.geometries.as_deref()?)
    }

    /// Rows of one reach. Only available at reach level.
    pub fn reach(&self, reach_id: i64) -> Result<Table> {
        if self.level != Level::Reaches {
            return Err(Error::Configuration(format!(
                "can not extract reach {reach_id} from a {} dataset",
                self.level
            )));
        }

        let rows = self.table.find("reach_id", reach_id)?;
        if rows.is_empty() {
            return Err(Error::ReachNotFound(reach_id));
        }

        Ok(self.table.take(&rows))
    }

    pub fn into_parts(self) -> (Table, Option<Vec<Polyline>>, Report) {
        (self.table, self.geometries, self.report)
    }
}
