//! Byte-stream transfer of a single file.
//!
//! The destination is opened in place (created or truncated) and the source
//! is streamed into it block by block. A failed transfer leaves whatever the
//! last successful write produced; there is no temp-file staging.

use crate::error::{Error, Result};
use crate::options::MirrorOptions;
use crate::utils::mode::{OWNER_WRITE, set_permission_bits};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

/// Copy the content of `src` over `dst` and leave `dst` with `mode`.
///
/// Returns the number of bytes written.
///
/// A destination whose mode denies writing to its owner is opened after
/// temporarily granting owner write; `mode` is applied once the data is in
/// place either way.
///
/// Every write and the final flush are checked. Closing the file cannot
/// report errors, so with `fsync` off an error the filesystem defers until
/// writeback (NFS, quotas) is not seen here; `sync_all` is the only guard.
pub(crate) fn transfer(src: &Path, dst: &Path, mode: u32, options: &MirrorOptions) -> Result<u64> {
    let mut reader = File::open(src).map_err(|source| Error::OpenSource {
        path: src.to_path_buf(),
        source,
    })?;
    let mut writer = open_destination(dst, mode)?;

    let mut buf = vec![0u8; options.block_size.max(1)];
    let mut copied: u64 = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::Read {
                    path: src.to_path_buf(),
                    source,
                });
            }
        };
        writer.write_all(&buf[..n]).map_err(|source| Error::Write {
            path: dst.to_path_buf(),
            source,
        })?;
        copied += n as u64;
    }

    writer.flush().map_err(|source| Error::Write {
        path: dst.to_path_buf(),
        source,
    })?;
    if options.fsync {
        writer.sync_all().map_err(|source| Error::Write {
            path: dst.to_path_buf(),
            source,
        })?;
    }
    // close errors are not observable through std
    drop(writer);

    set_permission_bits(dst, mode).map_err(|source| Error::SetPermissions {
        path: dst.to_path_buf(),
        source,
    })?;

    Ok(copied)
}

fn open_destination(dst: &Path, mode: u32) -> Result<File> {
    match File::create(dst) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && fs::symlink_metadata(dst).is_ok() => {
            set_permission_bits(dst, mode | OWNER_WRITE).map_err(|source| {
                Error::SetPermissions {
                    path: dst.to_path_buf(),
                    source,
                }
            })?;
            File::create(dst).map_err(|source| Error::OpenDestination {
                path: dst.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(Error::OpenDestination {
            path: dst.to_path_buf(),
            source,
        }),
    }
}
