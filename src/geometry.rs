//! Centerline geometries.
//!
//! Centerline points live in one global table (`centerlines/{cl_id,x,y}`).
//! Every reach (or node) declares the inclusive range of point *identifiers*
//! making up its centerline in `cl_ids`, shaped `(2, n)`: first row minimum,
//! second row maximum. Identifiers are not positions in the point table, so
//! they are resolved through a [`PointIndex`] built once per load.

use itertools::izip;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::select::Mask;
use crate::source::{Session, Source};
use crate::walk::Level;

const CENTERLINES: &str = "centerlines";

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn union(self, o: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(o.min_x),
            min_y: self.min_y.min(o.min_y),
            max_x: self.max_x.max(o.max_x),
            max_y: self.max_y.max(o.max_y),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            0.5 * (self.min_x + self.max_x),
            0.5 * (self.min_y + self.max_y),
        )
    }
}

/// An ordered sequence of `(x, y)` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<(f64, f64)>);

impl Polyline {
    pub fn coords(&self) -> &[(f64, f64)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bounds of the non-`NaN` points.
    pub fn bounds(&self) -> Option<Bounds> {
        self.0
            .iter()
            .filter(|(x, y)| !x.is_nan() && !y.is_nan())
            .map(|&(x, y)| Bounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            })
            .reduce(Bounds::union)
    }
}

impl From<Vec<(f64, f64)>> for Polyline {
    fn from(v: Vec<(f64, f64)>) -> Self {
        Polyline(v)
    }
}

/// Bounds of a set of polylines.
pub fn total_bounds(lines: &[Polyline]) -> Option<Bounds> {
    lines.iter().filter_map(Polyline::bounds).reduce(Bounds::union)
}

/// Point identifier to point lookup.
#[derive(Debug)]
pub struct PointIndex {
    positions: HashMap<i64, usize>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl PointIndex {
    pub fn new(ids: &[i64], x: Vec<f64>, y: Vec<f64>) -> Result<PointIndex> {
        if ids.len() != x.len() || ids.len() != y.len() {
            return Err(Error::structural(format!(
                "centerline arrays differ in length: cl_id {}, x {}, y {}",
                ids.len(),
                x.len(),
                y.len()
            )));
        }

        let mut positions = HashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if positions.insert(*id, i).is_some() {
                return Err(Error::structural(format!(
                    "duplicate centerline point identifier {id}"
                )));
            }
        }

        Ok(PointIndex { positions, x, y })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<(f64, f64)> {
        self.positions.get(&id).map(|&i| (self.x[i], self.y[i]))
    }

    /// Polyline of the inclusive identifier range `(min, max)`. `row` is only
    /// used for error reporting.
    pub fn polyline(&self, row: usize, (min, max): (i64, i64)) -> Result<Polyline> {
        if min > max {
            return Err(Error::structural(format!(
                "row {row}: centerline range {min}..={max} is reversed"
            )));
        }

        (min..=max)
            .map(|point| {
                self.get(point)
                    .ok_or(Error::DanglingReference { row, point })
            })
            .collect::<Result<Vec<_>>>()
            .map(Polyline)
    }
}

/// Reject ranges sharing a point identifier.
pub fn check_disjoint(ranges: &[(i64, i64)]) -> Result<()> {
    let mut sorted: Vec<(i64, i64, usize)> = ranges
        .iter()
        .enumerate()
        .map(|(i, &(lo, hi))| (lo, hi, i))
        .collect();
    sorted.sort_unstable();

    for w in sorted.windows(2) {
        let (a, b) = (w[0], w[1]);
        if b.0 <= a.1 {
            return Err(Error::structural(format!(
                "centerline ranges of rows {} ({}..={}) and {} ({}..={}) overlap",
                a.2, a.0, a.1, b.2, b.0, b.1
            )));
        }
    }

    Ok(())
}

/// Resolve every range into a polyline, one per range and in the same order.
///
/// Fails with [`Error::DanglingReference`] if any identifier of any range is
/// not in `point_ids`; no partial result is returned.
pub fn build_geometries(
    point_ids: &[i64],
    point_x: &[f64],
    point_y: &[f64],
    reach_ranges: &[(i64, i64)],
) -> Result<Vec<Polyline>> {
    let index = PointIndex::new(point_ids, point_x.to_vec(), point_y.to_vec())?;
    build_with_index(&index, reach_ranges)
}

pub fn build_with_index(index: &PointIndex, ranges: &[(i64, i64)]) -> Result<Vec<Polyline>> {
    ranges
        .par_iter()
        .enumerate()
        .map(|(row, range)| index.polyline(row, *range))
        .collect()
}

/// Centerline ranges of the selected entities of `level`, from `<level>/cl_ids`.
pub fn read_ranges<S: Source>(
    session: &Session<S>,
    level: Level,
    mask: &Mask,
) -> Result<Vec<(i64, i64)>> {
    let group = session.group(level.group())?;
    let info = group.variable_info("cl_ids")?;

    let aligned = matches!(info.dimensions.as_slice(), [_, d] if d == level.dimension())
        && matches!(info.shape.as_slice(), [2, _]);
    if !aligned {
        return Err(Error::structural(format!(
            "{}: cl_ids must be shaped (2, {}), found {:?} {:?}",
            group.path(),
            level.dimension(),
            info.dimensions,
            info.shape
        )));
    }

    let cl_ids = group.read("cl_ids")?.to_i64()?;
    if cl_ids.shape()[1] != mask.len() {
        return Err(Error::structural(format!(
            "{}: cl_ids has {} entries, selection has {}",
            group.path(),
            cl_ids.shape()[1],
            mask.len()
        )));
    }

    let lo = cl_ids.index_axis(ndarray::Axis(0), 0);
    let hi = cl_ids.index_axis(ndarray::Axis(0), 1);

    Ok(mask.gather(
        izip!(lo.iter(), hi.iter())
            .map(|(lo, hi)| (*lo, *hi))
            .collect::<Vec<_>>()
            .iter(),
    ))
}

/// Reconstruct the centerlines of the selected entities, row-aligned with the
/// primary table.
pub fn load_geometries<S: Source>(
    session: &Session<S>,
    level: Level,
    mask: &Mask,
    reject_overlaps: bool,
) -> Result<Vec<Polyline>> {
    let ranges = read_ranges(session, level, mask)?;
    if reject_overlaps {
        check_disjoint(&ranges)?;
    }

    let cl = session.group(CENTERLINES)?;
    let ids = cl.read("cl_id")?.ids()?;
    let x = cl.read("x")?.floats()?;
    let y = cl.read("y")?.floats()?;

    log::debug!(
        "building {} centerlines from {} points",
        ranges.len(),
        ids.len()
    );

    let index = PointIndex::new(&ids, x, y)?;
    build_with_index(&index, &ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_by_identifier() {
        let g = build_geometries(
            &[10, 11, 12, 13],
            &[0.0, 1.0, 2.0, 3.0],
            &[0.0, 0.0, 0.0, 0.0],
            &[(11, 13)],
        )
        .unwrap();

        assert_eq!(g.len(), 1);
        assert_eq!(g[0].coords(), [(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
    }

    #[test]
    fn identifiers_are_not_positions() {
        // stored out of order
        let g = build_geometries(
            &[12, 10, 13, 11],
            &[2.0, 0.0, 3.0, 1.0],
            &[20.0, 0.0, 30.0, 10.0],
            &[(10, 11), (12, 13)],
        )
        .unwrap();

        assert_eq!(g[0].coords(), [(0.0, 0.0), (1.0, 10.0)]);
        assert_eq!(g[1].coords(), [(2.0, 20.0), (3.0, 30.0)]);
    }

    #[test]
    fn length_matches_range() {
        let ids: Vec<i64> = (100..200).collect();
        let x: Vec<f64> = ids.iter().map(|i| *i as f64).collect();
        let ranges = [(100, 100), (101, 150), (151, 199)];

        let g = build_geometries(&ids, &x, &x, &ranges).unwrap();
        for (l, (lo, hi)) in g.iter().zip(ranges) {
            assert_eq!(l.len() as i64, hi - lo + 1);
        }
    }

    #[test]
    fn dangling() {
        let r = build_geometries(&[10, 11], &[0.0, 1.0], &[0.0, 0.0], &[(10, 11), (998, 999)]);
        assert!(matches!(
            r,
            Err(Error::DanglingReference { row: 1, point: 998 })
        ));
    }

    #[test]
    fn reversed_range() {
        let r = build_geometries(&[10, 11], &[0.0, 1.0], &[0.0, 0.0], &[(11, 10)]);
        assert!(matches!(r, Err(Error::StructuralMismatch(_))));
    }

    #[test]
    fn bad_point_table() {
        assert!(PointIndex::new(&[1, 2], vec![0.0], vec![0.0, 1.0]).is_err());
        assert!(PointIndex::new(&[1, 1], vec![0.0, 1.0], vec![0.0, 1.0]).is_err());
    }

    #[test]
    fn overlapping_ranges() {
        assert!(check_disjoint(&[(20, 29), (0, 9), (10, 19)]).is_ok());
        assert!(matches!(
            check_disjoint(&[(0, 10), (10, 19)]),
            Err(Error::StructuralMismatch(_))
        ));
        assert!(check_disjoint(&[]).is_ok());
    }

    #[test]
    fn bounds() {
        let a = Polyline::from(vec![(0.0, 1.0), (2.0, f64::NAN), (1.0, -1.0)]);
        let b = Polyline::from(vec![(-3.0, 0.5)]);

        let bb = total_bounds(&[a.clone(), b]).unwrap();
        assert_eq!(
            bb,
            Bounds {
                min_x: -3.0,
                min_y: -1.0,
                max_x: 1.0,
                max_y: 1.0
            }
        );
        assert_eq!(bb.center(), (-1.0, 0.0));
        assert!(Polyline::from(Vec::<(f64, f64)>::new()).bounds().is_none());
        assert_eq!(a.bounds().unwrap().max_x, 1.0);
    }
}
