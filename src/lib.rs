//! # SWORDFIX
//!
//! Extraction of analysis-ready tables from SWORD and SoS ("SWORD of Science")
//! river network files (NetCDF4).
//!
//! These files keep reach and node variables in separate groups, hydrologic
//! model priors in a `model` group, and the observations of independent gauge
//! networks (GRDC, USGS, ..) in sub-groups of `model`, each keyed by its own
//! reach identifiers. A [load](Dataset::load):
//!
//! 1. selects the reaches (or nodes) of interest by identifier,
//! 2. extracts every variable declared over the entity dimension from each
//!    group scope into one table, with scope prefixed column names,
//! 3. left joins every gauge overlay onto that table,
//! 4. optionally rebuilds the centerline of every row from the global
//!    centerline point table.
//!
//! Variables that are not per-entity (time series, centerline ranges) are
//! listed in a [`Report`] instead, and stay reachable through
//! [`Session::variable`](source::Session::variable).
//!
//! ## Usage
//!
//! ```
//! use swordfix::prelude::*;
//!
//! let source = MemorySource::new().group(
//!     "reaches",
//!     MemoryGroup::new()
//!         .variable(MemoryVariable::new("reach_id", &["num_reaches"], vec![11i64, 12, 13]))
//!         .variable(MemoryVariable::new("width", &["num_reaches"], vec![80.0, 95.0, 110.0])),
//! );
//!
//! let session = Session::new(source);
//! let options = LoadOptions::sword(Level::Reaches).reaches([12, 13]);
//! let ds = Dataset::load(&session, &options).unwrap();
//!
//! assert_eq!(ds.len(), 2);
//! println!("width: {:?}", ds.table().column("width"));
//! ```
//!
//! NetCDF files are opened with [`Dataset::open`] (feature `netcdf`, on by
//! default), or through a [`Session`](source::Session) over an
//! [`NcSource`](source::NcSource) when more than one thing is read from the
//! same file.

pub mod dataset;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod h2ivdi;
pub mod options;
pub mod overlay;
pub mod report;
pub mod select;
pub mod source;
pub mod swot;
pub mod table;
pub mod walk;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use report::Report;

pub mod prelude {
    pub use crate::dataset::Dataset;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Bounds, Polyline};
    pub use crate::options::{LoadOptions, Product};
    pub use crate::report::Report;
    #[cfg(feature = "netcdf")]
    pub use crate::source::NcSource;
    pub use crate::source::{
        GroupPath, MemoryGroup, MemorySource, MemoryVariable, Session, Source, Values,
    };
    pub use crate::table::{ColumnData, Table, Value};
    pub use crate::walk::Level;
}
