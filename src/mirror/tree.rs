//! Tree-level entry point.
//!
//! [`mirror_dir`] validates the two roots and runs the traversal of the root
//! pair on the worker pool. Counters from every directory worker are merged
//! into a single [`MirrorStats`] on the way back up.

use super::scheduler::WorkerPool;
use super::traverse::Traversal;
use crate::error::{Error, Result};
use crate::options::MirrorOptions;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

/// Statistics from a mirror operation.
///
/// Every directory worker produces one of these for its subtree; a parent
/// adds up its own counters and those of the workers it joined.
///
/// # Example
///
/// ```no_run
/// use treemirror::{MirrorOptions, mirror_dir};
/// use std::path::Path;
///
/// let stats = mirror_dir(Path::new("src"), Path::new("dst"), &MirrorOptions::default())?;
/// println!(
///     "{} created, {} overwritten, {} unchanged",
///     stats.files_created, stats.files_overwritten, stats.files_unchanged
/// );
/// # Ok::<(), treemirror::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MirrorStats {
    /// Files that did not exist at the destination and were copied
    pub files_created: u64,
    /// Existing destination files rewritten because size or content differed
    pub files_overwritten: u64,
    /// Existing destination files left untouched
    pub files_unchanged: u64,
    /// Source files skipped because their permission bits were all zero
    pub files_inaccessible: u64,
    /// Destination directories created
    pub dirs_created: u64,
    /// Directory pairs visited
    pub dirs_visited: u64,
    /// Destination entries whose permission bits were corrected
    pub permissions_synced: u64,
    /// Bytes written to destination files
    pub bytes_copied: u64,
    /// Directory workers started, root included
    pub workers: u64,
    /// Directory workers that ended with an error
    pub failed_workers: u64,
    /// Failed workers whose error was a full destination device
    pub out_of_space_failures: u64,
    /// Wall-clock time of the whole operation (set on the root only)
    pub duration: Duration,
}

impl MirrorStats {
    /// Add the counters of a joined child worker.
    pub(crate) fn absorb(&mut self, child: &Self) {
        self.files_created += child.files_created;
        self.files_overwritten += child.files_overwritten;
        self.files_unchanged += child.files_unchanged;
        self.files_inaccessible += child.files_inaccessible;
        self.dirs_created += child.dirs_created;
        self.dirs_visited += child.dirs_visited;
        self.permissions_synced += child.permissions_synced;
        self.bytes_copied += child.bytes_copied;
        self.workers += child.workers;
        self.failed_workers += child.failed_workers;
        self.out_of_space_failures += child.out_of_space_failures;
    }

    /// Files written, created or overwritten.
    #[must_use]
    pub fn files_copied(&self) -> u64 {
        self.files_created + self.files_overwritten
    }
}

/// Mirror the tree under `src` into `dst`.
///
/// Both roots must already exist and be directories (symlinks are followed
/// for this check only). Inside the tree:
///
/// - entries whose name starts with `.` are ignored, directories included
/// - missing directories are created with the source permission bits
/// - files are created when missing and rewritten when size or
///   [fingerprint](crate::DigestMode) differ
/// - permission bits of existing files and directories are brought in line
/// - symlinks and special files are ignored
/// - nothing is ever deleted from the destination
///
/// Each subdirectory is mirrored by its own worker on a pool of
/// [`MirrorOptions::parallel`] threads.
///
/// # Errors
///
/// Returns an error if:
/// - Either root is missing or not a directory ([`Error::SourceNotFound`],
///   [`Error::SourceNotADirectory`], [`Error::DestinationNotFound`],
///   [`Error::DestinationNotADirectory`]); the destination is not touched
/// - The root worker fails (for example [`Error::ReadDir`] on the source root)
/// - Any subdirectory worker failed ([`Error::PartialMirror`]); all other
///   workers ran to completion
pub fn mirror_dir(src: &Path, dst: &Path, options: &MirrorOptions) -> Result<MirrorStats> {
    let start_time = Instant::now();

    check_root(src, Error::SourceNotFound, Error::SourceNotADirectory)?;
    check_root(
        dst,
        Error::DestinationNotFound,
        Error::DestinationNotADirectory,
    )?;

    let pool = WorkerPool::new(options);
    let traversal = Traversal::new(options);
    let mut stats = pool.install(|| traversal.visit(src, dst, 0))?;
    stats.duration = start_time.elapsed();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        workers = stats.workers,
        failed = stats.failed_workers,
        files_copied = stats.files_copied(),
        bytes = stats.bytes_copied,
        "mirror finished"
    );

    if stats.failed_workers > 0 {
        return Err(Error::PartialMirror {
            failed: stats.failed_workers,
            workers: stats.workers,
            out_of_space: stats.out_of_space_failures,
        });
    }

    Ok(stats)
}

/// Mirror `src` into `dst` with default [`MirrorOptions`].
///
/// See [`mirror_dir`] for the rules and the possible errors.
///
/// ```no_run
/// let stats = treemirror::mirror("photos", "/mnt/backup/photos")?;
/// # Ok::<(), treemirror::Error>(())
/// ```
pub fn mirror<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<MirrorStats> {
    mirror_dir(src.as_ref(), dst.as_ref(), &MirrorOptions::default())
}

fn check_root(
    path: &Path,
    missing: fn(std::path::PathBuf) -> Error,
    not_dir: fn(std::path::PathBuf) -> Error,
) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(not_dir(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(missing(path.to_path_buf())),
        Err(source) => Err(Error::Metadata {
            path: path.to_path_buf(),
            source,
        }),
    }
}
