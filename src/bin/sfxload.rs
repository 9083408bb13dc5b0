//! Load the per-entity table of a SWORD or SoS file and print a summary.
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};

use swordfix::prelude::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// SWORD or SoS file (NetCDF4).
    input: PathBuf,

    /// Entity level: reaches or nodes.
    #[arg(short, long, default_value = "reaches")]
    level: Level,

    /// The file is a SWORD file (no model group or overlays).
    #[arg(long)]
    sword: bool,

    /// Comma separated reach identifiers to keep.
    #[arg(short, long, value_delimiter = ',')]
    reaches: Vec<i64>,

    /// File with one reach identifier per line.
    #[arg(long)]
    reaches_file: Option<PathBuf>,

    /// Reconstruct centerlines.
    #[arg(short, long)]
    geometry: bool,

    /// Print the first rows.
    #[arg(long, default_value_t = 0)]
    head: usize,
}

fn read_reaches(path: &Path) -> anyhow::Result<Vec<i64>> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {path:?}"))?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            l.parse::<i64>()
                .with_context(|| format!("invalid reach identifier: {l}"))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut reaches = args.reaches.clone();
    if let Some(f) = &args.reaches_file {
        reaches.extend(read_reaches(f)?);
    }

    let mut options = if args.sword {
        LoadOptions::sword(args.level)
    } else {
        LoadOptions::new(args.level)
    };
    if !reaches.is_empty() {
        options = options.reaches(reaches);
    }
    if args.geometry {
        options = options.with_geometry();
    }

    println!("Loading {} from {:?}..", args.level, args.input);

    let ds = Dataset::open(&args.input, &options)?;
    let table = ds.table();

    println!("{} rows, {} columns:\n", table.nrows(), table.ncols());
    println!("{:4}{:40} range:", "", "name:");
    for c in table.columns() {
        match c.data.range() {
            Some((lo, hi)) => println!("{:4}{:40} {lo} .. {hi}", "", c.name),
            None => println!("{:4}{:40}", "", c.name),
        }
    }

    if !ds.report().is_empty() {
        println!("\nNot extracted:\n{}", ds.report());
    }

    if let Some(b) = ds.bounds() {
        println!(
            "\nBounds: x {} .. {}, y {} .. {}",
            b.min_x, b.max_x, b.min_y, b.max_y
        );
    }

    for r in 0..args.head.min(table.nrows()) {
        if let Some(row) = table.row(r) {
            let cells: Vec<String> = row.iter().map(|(n, v)| format!("{n}={v}")).collect();
            println!("{r:6}: {}", cells.join(", "));
        }
    }

    Ok(())
}
