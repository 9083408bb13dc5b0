use divan::Bencher;
use rand::Rng;

use swordfix::prelude::*;

const REACHES: usize = 50_000;

fn sos() -> MemorySource {
    let mut rng = rand::thread_rng();
    let ids: Vec<i64> = (0..REACHES as i64).map(|i| 71_000_000_000 + i).collect();

    let mut reaches = MemoryGroup::new().variable(MemoryVariable::new(
        "reach_id",
        &["num_reaches"],
        ids.clone(),
    ));
    let mut model = MemoryGroup::new();

    for i in 0..20 {
        let v: Vec<f64> = (0..REACHES).map(|_| rng.gen()).collect();
        reaches = reaches.variable(MemoryVariable::new(&format!("v{i}"), &["num_reaches"], v.clone()));
        model = model.variable(MemoryVariable::new(&format!("q{i}"), &["num_reaches"], v));
    }

    let gauged: Vec<i64> = ids.iter().copied().step_by(7).collect();
    let n = gauged.len();
    let grdc = MemoryGroup::new()
        .variable(MemoryVariable::new("reach_id", &["num_grdc_reaches"], gauged))
        .variable(MemoryVariable::new(
            "grdc_qmean",
            &["num_grdc_reaches"],
            vec![1.0; n],
        ));

    MemorySource::new()
        .group("reaches", reaches)
        .group("model", model.group("grdc", grdc))
}

#[divan::bench]
fn load_all(b: Bencher) {
    let s = Session::new(sos());
    let o = LoadOptions::new(Level::Reaches);

    b.bench_local(|| Dataset::load(&s, &o).unwrap())
}

#[divan::bench]
fn load_subset(b: Bencher) {
    let s = Session::new(sos());
    let o = LoadOptions::new(Level::Reaches).reaches((0..1000).map(|i| 71_000_000_000 + i * 13));

    b.bench_local(|| Dataset::load(&s, &o).unwrap())
}

fn main() {
    divan::main();
}
