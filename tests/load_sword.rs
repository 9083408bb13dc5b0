use ndarray::Array2;
use swordfix::prelude::*;

fn cl_ids(ranges: &[(i64, i64)]) -> Array2<i64> {
    let lo = ranges.iter().map(|r| r.0);
    let hi = ranges.iter().map(|r| r.1);
    Array2::from_shape_vec((2, ranges.len()), lo.chain(hi).collect()).unwrap()
}

/// Three reaches over a centerline of eight points, stored out of
/// identifier order.
fn sword(ranges: &[(i64, i64)]) -> MemorySource {
    MemorySource::new()
        .group(
            "centerlines",
            MemoryGroup::new()
                .variable(MemoryVariable::new(
                    "cl_id",
                    &["num_points"],
                    vec![17i64, 10, 11, 12, 13, 14, 15, 16],
                ))
                .variable(MemoryVariable::new(
                    "x",
                    &["num_points"],
                    vec![7.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
                ))
                .variable(MemoryVariable::new(
                    "y",
                    &["num_points"],
                    vec![70.0, 0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
                )),
        )
        .group(
            "reaches",
            MemoryGroup::new()
                .variable(MemoryVariable::new(
                    "reach_id",
                    &["num_reaches"],
                    vec![1i64, 2, 3],
                ))
                .variable(MemoryVariable::new(
                    "reach_length",
                    &["num_reaches"],
                    vec![100.0, 200.0, 300.0],
                ))
                .variable(MemoryVariable::new(
                    "cl_ids",
                    &["nc", "num_reaches"],
                    cl_ids(ranges),
                )),
        )
}

const RANGES: [(i64, i64); 3] = [(10, 12), (13, 14), (15, 17)];

#[test]
fn geometries_follow_rows() {
    let s = Session::new(sword(&RANGES));
    let ds = Dataset::load(&s, &LoadOptions::sword(Level::Reaches).with_geometry()).unwrap();

    let g = ds.geometries().unwrap();
    assert_eq!(g.len(), ds.len());
    assert_eq!(g[0].coords(), [(0.0, 0.0), (1.0, 10.0), (2.0, 20.0)]);
    assert_eq!(g[1].coords(), [(3.0, 30.0), (4.0, 40.0)]);
    assert_eq!(g[2].coords(), [(5.0, 50.0), (6.0, 60.0), (7.0, 70.0)]);

    let b = ds.bounds().unwrap();
    assert_eq!((b.min_x, b.max_x), (0.0, 7.0));
    assert_eq!((b.min_y, b.max_y), (0.0, 70.0));
}

#[test]
fn geometries_follow_selection() {
    let s = Session::new(sword(&RANGES));
    let o = LoadOptions::sword(Level::Reaches)
        .reaches([3, 2])
        .with_geometry();
    let ds = Dataset::load(&s, &o).unwrap();

    assert_eq!(ds.len(), 2);
    assert_eq!(ds.table().value("reach_id", 0), Some(Value::Int(2)));

    let g = ds.geometries().unwrap();
    assert_eq!(g[0].len(), 2);
    assert_eq!(g[1].coords()[0], (5.0, 50.0));
    assert_eq!(ds.bounds().unwrap().min_x, 3.0);
}

#[test]
fn dangling_point_fails_the_load() {
    let s = Session::new(sword(&[(10, 12), (13, 14), (15, 999)]));
    let o = LoadOptions::sword(Level::Reaches).with_geometry();

    assert!(matches!(
        Dataset::load(&s, &o),
        Err(Error::DanglingReference { row: 2, .. })
    ));

    // not selected, not resolved
    let o = LoadOptions::sword(Level::Reaches)
        .reaches([1, 2])
        .with_geometry();
    assert_eq!(Dataset::load(&s, &o).unwrap().geometries().unwrap().len(), 2);
}

#[test]
fn overlapping_ranges() {
    let s = Session::new(sword(&[(10, 13), (13, 14), (15, 17)]));

    let o = LoadOptions::sword(Level::Reaches).with_geometry();
    assert!(matches!(
        Dataset::load(&s, &o),
        Err(Error::StructuralMismatch(_))
    ));

    let ds = Dataset::load(&s, &o.allow_overlapping_ranges()).unwrap();
    let g = ds.geometries().unwrap();
    assert_eq!(g[0].coords().last().copied(), g[1].coords().first().copied());
}

#[test]
fn reversed_range() {
    let s = Session::new(sword(&[(12, 10), (13, 14), (15, 17)]));
    let o = LoadOptions::sword(Level::Reaches).with_geometry();

    assert!(matches!(
        Dataset::load(&s, &o),
        Err(Error::StructuralMismatch(_))
    ));
}

#[test]
fn without_geometry() {
    let s = Session::new(sword(&[(10, 999), (13, 14), (15, 17)]));
    let ds = Dataset::load(&s, &LoadOptions::sword(Level::Reaches)).unwrap();

    assert!(ds.geometries().is_none());
    assert_eq!(
        ds.table().names().collect::<Vec<_>>(),
        ["reach_id", "reach_length"]
    );
    assert_eq!(ds.report().get("reaches").unwrap(), ["cl_ids"]);
    assert!(ds.report().get("model").is_none());
}

#[test]
fn into_parts() {
    let s = Session::new(sword(&RANGES));
    let ds = Dataset::load(&s, &LoadOptions::sword(Level::Reaches).with_geometry()).unwrap();

    let (table, geometries, report) = ds.into_parts();
    assert_eq!(table.nrows(), 3);
    assert_eq!(geometries.map(|g| g.len()), Some(3));
    assert_eq!(report.len(), 1);
}
