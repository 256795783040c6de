//! Point correlation over a packed kd-tree.
//!
//! Counts, for every point of a data set, how many points of the same set lie within a radius.
//!
//! ```text
//! cargo run --release --example point_correlation -- <radius> <npoints> [points.txt]
//! ```
//!
//! Without a file, `npoints` uniformly random points in the unit square are used. Set
//! `RUST_LOG=debug` to see build diagnostics.

use std::process::ExitCode;
use std::time::Instant;

use packed_kdtree::input::read_points_from_path;
use packed_kdtree::kdtree::{AlternatingAxis, PackedTreeBuilder, PackedTreeIndex};
use packed_kdtree::{PackedTreeError, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <radius> <npoints> [points.txt]", args[0]);
        return ExitCode::FAILURE;
    }

    match run(&args[1], &args[2], args.get(3).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(radius: &str, npoints: &str, path: Option<&str>) -> Result<(), PackedTreeError> {
    let radius: f32 = radius
        .parse()
        .ok()
        .filter(|r: &f32| *r >= 0.0)
        .ok_or_else(|| PackedTreeError::InvalidInput(format!("Bad radius {radius:?}.")))?;
    let npoints: u32 = npoints
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| PackedTreeError::InvalidInput(format!("Bad point count {npoints:?}.")))?;

    let points = match path {
        Some(path) => read_points_from_path(path, Some(npoints as usize))?,
        None => {
            let mut rng = StdRng::seed_from_u64(0);
            (0..npoints)
                .map(|_| Point::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
                .collect()
        }
    };

    let start = Instant::now();
    let mut builder = PackedTreeBuilder::new(npoints);
    builder.add_points(points);
    let mut tree = builder.finish::<AlternatingAxis>()?;
    let build_time = start.elapsed();

    let start = Instant::now();
    let total = tree.correlate_all(radius);
    let query_time = start.elapsed();

    println!(
        "{} points, {} bytes, depth {}",
        tree.num_items(),
        tree.as_ref().len(),
        tree.depth()
    );
    println!("build: {build_time:?}, correlation: {query_time:?}");
    println!(
        "pairs within {radius}: {total} (avg {:.2} per point)",
        total as f64 / tree.num_items() as f64
    );
    Ok(())
}
