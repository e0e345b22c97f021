//! Per-directory traversal.
//!
//! A [`Traversal`] visits one directory pair: it makes sure the destination
//! directory exists, mirrors every regular file in place and hands each
//! subdirectory to a new worker. Entries are processed in the order the
//! directory stream yields them.

use super::oracle::{Decision, FileRecord, SkipReason, decide};
use super::path::{child_paths, ensure_dest_directory};
use super::scheduler::{Spawner, fan_out, join_into};
use super::transfer::transfer;
use super::tree::MirrorStats;
use crate::error::{Error, Result};
use crate::options::MirrorOptions;
use crate::utils::mode::{OWNER_WRITE_SEARCH, set_permission_bits};
use std::ffi::OsStr;
use std::fs::{self, Metadata, ReadDir};
use std::path::Path;

/// Whether an entry name marks a hidden entry (leading `.`).
pub(crate) fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

pub(crate) struct Traversal<'o> {
    options: &'o MirrorOptions,
}

impl<'o> Traversal<'o> {
    pub(crate) fn new(options: &'o MirrorOptions) -> Self {
        Self { options }
    }

    /// Mirror `src_dir` into `dst_dir`, returning the stats of the whole subtree.
    ///
    /// Returns only after every worker spawned for a subdirectory has
    /// finished. An error ends this worker; workers already running for
    /// sibling subdirectories are still joined first.
    pub(crate) fn visit(&self, src_dir: &Path, dst_dir: &Path, depth: usize) -> Result<MirrorStats> {
        if let Some(max_depth) = self.options.max_depth {
            if depth > max_depth {
                return Err(Error::MaxDepthExceeded {
                    path: src_dir.to_path_buf(),
                    max_depth,
                });
            }
        }

        let entries = fs::read_dir(src_dir).map_err(|source| Error::ReadDir {
            path: src_dir.to_path_buf(),
            source,
        })?;
        let setup = ensure_dest_directory(src_dir, dst_dir)?;

        let mut stats = MirrorStats {
            dirs_visited: 1,
            dirs_created: setup.created,
            permissions_synced: u64::from(setup.synced),
            workers: 1,
            ..MirrorStats::default()
        };

        // Populating needs owner write+search; the real mode goes back on
        // once every child worker has joined.
        let widened = setup.mode & OWNER_WRITE_SEARCH != OWNER_WRITE_SEARCH;
        if widened {
            set_permission_bits(dst_dir, setup.mode | 0o700).map_err(|source| {
                Error::SetPermissions {
                    path: dst_dir.to_path_buf(),
                    source,
                }
            })?;
        }

        let (walked, reports) =
            fan_out(|spawner| self.walk(entries, src_dir, dst_dir, depth, &mut stats, spawner));
        join_into(&mut stats, reports, self.options);

        let restored = if widened {
            set_permission_bits(dst_dir, setup.mode).map_err(|source| Error::SetPermissions {
                path: dst_dir.to_path_buf(),
                source,
            })
        } else {
            Ok(())
        };

        walked?;
        restored?;
        Ok(stats)
    }

    fn walk<'scope>(
        &'scope self,
        entries: ReadDir,
        src_dir: &Path,
        dst_dir: &Path,
        depth: usize,
        stats: &mut MirrorStats,
        spawner: &mut Spawner<'_, 'scope>,
    ) -> Result<()> {
        for entry in entries {
            let entry = entry.map_err(|source| Error::ReadDir {
                path: src_dir.to_path_buf(),
                source,
            })?;
            let name = entry.file_name();
            if is_hidden(&name) {
                continue;
            }

            let (src, dst) = child_paths(src_dir, dst_dir, &name);
            let meta = fs::symlink_metadata(&src).map_err(|source| Error::Metadata {
                path: src.clone(),
                source,
            })?;
            let file_type = meta.file_type();

            if file_type.is_file() {
                self.mirror_file(&src, &dst, &meta, stats)?;
            } else if file_type.is_dir() {
                spawner.spawn(src.clone(), move || self.visit(&src, &dst, depth + 1));
            } else {
                #[cfg(feature = "tracing")]
                tracing::trace!(path = %src.display(), "ignoring non-regular entry");
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            dir = %src_dir.display(),
            workers = spawner.spawned(),
            "directory listed, joining workers"
        );

        Ok(())
    }

    fn mirror_file(
        &self,
        src: &Path,
        dst: &Path,
        meta: &Metadata,
        stats: &mut MirrorStats,
    ) -> Result<()> {
        let record = FileRecord::probe(src, dst, meta)?;
        let verdict = decide(&record, self.options)?;
        if verdict.permissions_synced {
            stats.permissions_synced += 1;
        }

        match verdict.decision {
            Decision::Create => {
                stats.bytes_copied += transfer(src, dst, record.source_mode, self.options)?;
                stats.files_created += 1;
            }
            Decision::Overwrite(_) => {
                stats.bytes_copied += transfer(src, dst, record.source_mode, self.options)?;
                stats.files_overwritten += 1;
            }
            Decision::Skip(SkipReason::Unchanged) => stats.files_unchanged += 1,
            Decision::Skip(SkipReason::Inaccessible) => stats.files_inaccessible += 1,
        }

        self.options.verbose(&format!(
            "{} {} -> {}",
            verdict.decision.describe(),
            src.display(),
            dst.display()
        ));
        Ok(())
    }
}
