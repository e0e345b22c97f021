//! Permission-bit helpers.
//!
//! Mirroring compares and copies only the low nine permission bits
//! (`rwxrwxrwx`). Set-id, sticky and file-type bits are ignored.
//!
//! On non-Unix platforms the nine bits are synthesized from the read-only
//! flag, and applying a mode only toggles that flag.

use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

/// Mask selecting the owner/group/other permission bits.
pub(crate) const PERMISSION_MASK: u32 = 0o777;

/// Owner write and owner search bits.
pub(crate) const OWNER_WRITE_SEARCH: u32 = 0o300;

/// Owner write bit.
pub(crate) const OWNER_WRITE: u32 = 0o200;

/// Permission bits of `meta`, masked to the low nine bits.
#[cfg(unix)]
pub(crate) fn permission_bits(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & PERMISSION_MASK
}

#[cfg(not(unix))]
pub(crate) fn permission_bits(meta: &Metadata) -> u32 {
    let base = if meta.is_dir() { 0o755 } else { 0o644 };
    if meta.permissions().readonly() {
        base & !0o222
    } else {
        base
    }
}

/// Apply `mode` (masked to nine bits) to `path`.
#[cfg(unix)]
pub(crate) fn set_permission_bits(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & PERMISSION_MASK))
}

#[cfg(not(unix))]
pub(crate) fn set_permission_bits(path: &Path, mode: u32) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, perms)
}
