//! Scratch-bracketed file loading example.
//!
//! Demonstrates: long-lived allocations → mark → load a file into a
//! transient buffer → derive a small summary → pop → reset.
//!
//! Run with `RUST_LOG=stam_arena=debug` to see growth and pop events.

use std::fs::File;

use stam_arena::Arena;
use stam_bench::{frame_profile, load_blob};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml").to_string());

    let mut arena = Arena::with_config(frame_profile())?;
    let name = arena.alloc_str(&path)?.len();
    println!("Before load: {}", arena.stats());

    let mut file = File::open(&path)?;
    let len = usize::try_from(file.metadata()?.len())?;

    let mark = arena.scratch_mark();
    let checksum = {
        let blob = load_blob(&arena, &mut file, len)?;
        blob.iter().fold(0u32, |acc, &b| acc.rotate_left(5) ^ b as u32)
    };
    println!("During load: {}", arena.stats());
    arena.pop_scratch(mark);

    tracing::info!(path = %path, bytes = len, checksum, "loaded transient buffer");
    println!("After pop:   {}", arena.stats());
    println!("Path length kept across the bracket: {name}");

    arena.reset();
    println!("After reset: {}", arena.stats());
    arena.destroy();
    Ok(())
}
