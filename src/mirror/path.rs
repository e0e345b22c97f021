//! Destination path resolution.
//!
//! Joins entry names onto directory pairs and makes sure a destination
//! directory exists with the same permission bits as its source.

use crate::error::{Error, Result};
use crate::utils::mode::{permission_bits, set_permission_bits};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of [`ensure_dest_directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DirSetup {
    /// Source directory permission bits, now also on the destination
    pub mode: u32,
    /// Number of directories created (leaf plus missing ancestors)
    pub created: u64,
    /// Whether an existing destination had its mode corrected
    pub synced: bool,
}

/// Source and destination paths of the entry `name` inside a directory pair.
pub(crate) fn child_paths(src_dir: &Path, dst_dir: &Path, name: &OsStr) -> (PathBuf, PathBuf) {
    (src_dir.join(name), dst_dir.join(name))
}

/// Make sure `dst_dir` exists and carries the permission bits of `src_dir`.
///
/// Missing ancestors of `dst_dir` are created too. The two chains are
/// walked upward in lockstep: the destination's n-th missing ancestor takes
/// the mode of the source's n-th ancestor, or the leaf mode when the source
/// chain is shorter.
///
/// The mode comparison runs on every call, not just after creation.
pub(crate) fn ensure_dest_directory(src_dir: &Path, dst_dir: &Path) -> Result<DirSetup> {
    let src_meta = fs::metadata(src_dir).map_err(|source| Error::Metadata {
        path: src_dir.to_path_buf(),
        source,
    })?;
    let mode = permission_bits(&src_meta);

    let created = match fs::metadata(dst_dir) {
        Ok(meta) if meta.is_dir() => 0,
        Ok(_) => {
            return Err(Error::CreateDir {
                path: dst_dir.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a non-directory entry is in the way",
                ),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => create_chain(src_dir, dst_dir, mode)?,
        Err(source) => {
            return Err(Error::Metadata {
                path: dst_dir.to_path_buf(),
                source,
            });
        }
    };

    let dst_meta = fs::metadata(dst_dir).map_err(|source| Error::Metadata {
        path: dst_dir.to_path_buf(),
        source,
    })?;
    let synced = permission_bits(&dst_meta) != mode;
    if synced {
        set_permission_bits(dst_dir, mode).map_err(|source| Error::SetPermissions {
            path: dst_dir.to_path_buf(),
            source,
        })?;
    }

    Ok(DirSetup {
        mode,
        created,
        synced,
    })
}

/// Create `dst_dir` and every missing ancestor, returning how many were made.
fn create_chain(src_dir: &Path, dst_dir: &Path, leaf_mode: u32) -> Result<u64> {
    // missing[0] is the leaf, missing[n] its n-th ancestor
    let missing: Vec<&Path> = dst_dir
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && fs::symlink_metadata(dir).is_err())
        .collect();

    let src_chain: Vec<&Path> = src_dir.ancestors().collect();
    let mut modes = Vec::with_capacity(missing.len());
    for depth in 0..missing.len() {
        let mode = match src_chain.get(depth) {
            Some(ancestor) if depth > 0 && !ancestor.as_os_str().is_empty() => {
                let meta = fs::metadata(ancestor).map_err(|source| Error::Metadata {
                    path: ancestor.to_path_buf(),
                    source,
                })?;
                permission_bits(&meta)
            }
            _ => leaf_mode,
        };
        modes.push(mode);
    }

    // Create top-down with default bits so every level stays writable while
    // the next one is made, then apply the final modes bottom-up.
    for dir in missing.iter().rev() {
        match fs::create_dir(dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(source) => {
                return Err(Error::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        }
    }
    for (dir, mode) in missing.iter().zip(&modes) {
        set_permission_bits(dir, *mode).map_err(|source| Error::SetPermissions {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    Ok(missing.len() as u64)
}
