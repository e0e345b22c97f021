//! Per-file change detection.
//!
//! [`decide`] looks at a [`FileRecord`] and picks one of create, overwrite or
//! skip. As a side effect it brings the permission bits of an existing
//! destination in line with the source, whatever the content verdict.

use super::digest::ContentDigest;
use crate::error::{Error, Result};
use crate::options::MirrorOptions;
use crate::utils::mode::{permission_bits, set_permission_bits};
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

/// What is known about an existing destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DestState {
    pub mode: u32,
    pub size: u64,
}

/// Snapshot of one regular file and its destination counterpart.
#[derive(Debug, Clone)]
pub(crate) struct FileRecord<'a> {
    pub src: &'a Path,
    pub dst: &'a Path,
    pub source_mode: u32,
    pub source_size: u64,
    /// `None` when nothing exists at `dst`
    pub dest: Option<DestState>,
}

impl<'a> FileRecord<'a> {
    /// Build a record from the already-read source metadata and an lstat of `dst`.
    ///
    /// A directory at `dst` is refused up front so its mode is never touched.
    pub(crate) fn probe(src: &'a Path, dst: &'a Path, src_meta: &Metadata) -> Result<Self> {
        let dest = match fs::symlink_metadata(dst) {
            Ok(meta) if meta.is_dir() => {
                return Err(Error::OpenDestination {
                    path: dst.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::IsADirectory,
                        "a directory is in the way",
                    ),
                });
            }
            Ok(meta) => Some(DestState {
                mode: permission_bits(&meta),
                size: meta.len(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(Error::Metadata {
                    path: dst.to_path_buf(),
                    source,
                });
            }
        };

        Ok(Self {
            src,
            dst,
            source_mode: permission_bits(src_meta),
            source_size: src_meta.len(),
            dest,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OverwriteReason {
    SizeMismatch,
    ContentMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    Unchanged,
    /// Source permission bits are all zero
    Inaccessible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Create,
    Overwrite(OverwriteReason),
    Skip(SkipReason),
}

impl Decision {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Overwrite(OverwriteReason::SizeMismatch) => "overwrite (size differs)",
            Self::Overwrite(OverwriteReason::ContentMismatch) => "overwrite (content differs)",
            Self::Skip(SkipReason::Unchanged) => "skip (unchanged)",
            Self::Skip(SkipReason::Inaccessible) => "skip (inaccessible)",
        }
    }
}

/// Decision plus whether the destination mode had to be corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Verdict {
    pub decision: Decision,
    pub permissions_synced: bool,
}

/// Decide what to do with one file.
///
/// Order matters: a missing destination always means create, permission
/// sync precedes the inaccessible check, and a size mismatch overwrites
/// without fingerprinting.
pub(crate) fn decide(record: &FileRecord<'_>, options: &MirrorOptions) -> Result<Verdict> {
    let Some(dest) = record.dest else {
        return Ok(Verdict {
            decision: Decision::Create,
            permissions_synced: false,
        });
    };

    let permissions_synced = dest.mode != record.source_mode;
    if permissions_synced {
        set_permission_bits(record.dst, record.source_mode).map_err(|source| {
            Error::SetPermissions {
                path: record.dst.to_path_buf(),
                source,
            }
        })?;
    }

    let decision = if record.source_mode == 0 {
        options.warn(&format!(
            "could not access file permissions: {}",
            record.src.display()
        ));
        Decision::Skip(SkipReason::Inaccessible)
    } else if record.source_size != dest.size {
        Decision::Overwrite(OverwriteReason::SizeMismatch)
    } else {
        let src_digest = ContentDigest::of_file(record.src, options.digest, options.block_size)?;
        let dst_digest = ContentDigest::of_file(record.dst, options.digest, options.block_size)?;
        if src_digest == dst_digest {
            Decision::Skip(SkipReason::Unchanged)
        } else {
            Decision::Overwrite(OverwriteReason::ContentMismatch)
        }
    };

    Ok(Verdict {
        decision,
        permissions_synced,
    })
}
