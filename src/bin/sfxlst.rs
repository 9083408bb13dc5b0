//! List the groups and variables of a SWORD, SoS or SWOT file to stdout.
use clap::Parser;
use std::path::PathBuf;

use swordfix::source::{GroupRef, NcSource, Session, Source};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    input: PathBuf,

    /// Only list the group tree.
    #[arg(short, long)]
    groups: bool,
}

fn list<S: Source>(g: &GroupRef<'_, S>, depth: usize, groups_only: bool) -> anyhow::Result<()> {
    let indent = depth * 4;
    println!("{:indent$}{}", "", g.path());

    if !groups_only {
        for v in g.variables()? {
            println!(
                "{:indent$}{:4}{:30} {:?} {:?} {:?}",
                "", "", v.name, v.kind, v.dimensions, v.shape
            );
        }
    }

    for name in g.group_names()? {
        list(&g.group(&name)?, depth + 1, groups_only)?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Listing {:?}..", args.input);

    let mut session = Session::new(NcSource::open(&args.input)?);
    let r = list(&session.root()?, 0, args.groups);
    session.close();

    r
}
