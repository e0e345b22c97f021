//! # treemirror
//!
//! Parallel one-way mirroring of a directory tree.
//!
//! ## Core Features
//!
//! - **Parallel walk**: every subdirectory is mirrored by its own worker on a
//!   bounded rayon pool; a directory returns only after all of its workers joined
//! - **Change detection**: files are copied when missing, and rewritten when
//!   their size or content fingerprint differs
//! - **Permission sync**: permission bits of files and directories follow the source
//! - **Additive**: nothing is ever removed from the destination
//! - **Hidden entries skipped**: names starting with `.` are not mirrored
//! - **Isolated failures**: a failing subdirectory stops only its own worker
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use treemirror::MirrorBuilder;
//!
//! let stats = MirrorBuilder::new("src", "dst").run()?;
//! println!(
//!     "{} created, {} overwritten, {} unchanged",
//!     stats.files_created, stats.files_overwritten, stats.files_unchanged
//! );
//! # Ok::<(), treemirror::Error>(())
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use treemirror::{DigestMode, MirrorOptions, mirror_dir};
//! use std::path::Path;
//!
//! let options = MirrorOptions::default()
//!     .with_parallel(8)
//!     .with_digest(DigestMode::Full)
//!     .with_max_depth(64)
//!     .without_fsync();
//!
//! let stats = mirror_dir(Path::new("src"), Path::new("dst"), &options)?;
//! println!("{} workers, {} bytes", stats.workers, stats.bytes_copied);
//! # Ok::<(), treemirror::Error>(())
//! ```
//!
//! ## Change Detection
//!
//! For a file that exists on both sides the permission bits are synced first.
//! Then the file is rewritten when the sizes differ, or when the sizes match
//! but the 8-byte XOR fingerprints differ. The fingerprint is a cheap
//! heuristic, not a checksum: equal-size files whose bytes are permuted
//! within the same offset class modulo 8 compare equal.
//! [`DigestMode::Prefix`] only looks at the first few bytes and is lossier still.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for [`MirrorOptions`] and [`MirrorStats`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod error;
mod mirror;
mod options;
mod utils;

pub use builder::MirrorBuilder;
pub use error::{Error, Result, is_no_space_error};
pub use mirror::{MirrorStats, mirror, mirror_dir};
pub use options::{DigestMode, MirrorOptions};
