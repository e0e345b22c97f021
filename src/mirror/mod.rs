//! Tree mirroring.
//!
//! Leaf modules first: `path` and `digest` are helpers, `oracle` and
//! `transfer` handle one file, `traverse` handles one directory and
//! `scheduler` runs its subdirectories as workers. `tree` is the entry point.

mod digest;
mod oracle;
mod path;
mod scheduler;
mod transfer;
mod traverse;
mod tree;

pub use tree::{MirrorStats, mirror, mirror_dir};
