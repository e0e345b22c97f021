//! Content fingerprints used to spot changed files of equal size.
//!
//! The fingerprint XOR-folds bytes cyclically into eight accumulator slots
//! (`acc[i % 8] ^= byte`). It is cheap and catches most edits, but it is not
//! collision resistant; see [`DigestMode`] for the coverage trade-off.

use crate::error::{Error, Result};
use crate::options::DigestMode;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Width of the fingerprint in bytes.
pub(crate) const DIGEST_LEN: usize = 8;

/// Bytes examined by [`DigestMode::Prefix`]: the width of a pointer.
pub(crate) const PREFIX_LEN: usize = std::mem::size_of::<*const u8>();

/// Fixed-width content fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    /// Fold `bytes`, which start at stream offset `offset`, into the digest.
    fn fold(&mut self, offset: u64, bytes: &[u8]) {
        let start = (offset % DIGEST_LEN as u64) as usize;
        for (i, byte) in bytes.iter().enumerate() {
            self.0[(start + i) % DIGEST_LEN] ^= byte;
        }
    }

    /// Fingerprint everything `reader` yields up to `limit` bytes.
    pub(crate) fn from_reader<R: Read>(
        reader: &mut R,
        limit: Option<u64>,
        block_size: usize,
    ) -> io::Result<Self> {
        let mut digest = Self::default();
        let mut buf = vec![0u8; block_size.max(1)];
        let mut offset: u64 = 0;

        loop {
            let want = match limit {
                Some(limit) if offset >= limit => break,
                Some(limit) => buf.len().min((limit - offset) as usize),
                None => buf.len(),
            };
            let n = match reader.read(&mut buf[..want]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            digest.fold(offset, &buf[..n]);
            offset += n as u64;
        }

        Ok(digest)
    }

    /// Fingerprint the file at `path`.
    pub(crate) fn of_file(path: &Path, mode: DigestMode, block_size: usize) -> Result<Self> {
        let mut file = File::open(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let limit = match mode {
            DigestMode::Full => None,
            DigestMode::Prefix => Some(PREFIX_LEN as u64),
        };
        Self::from_reader(&mut file, limit, block_size).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    #[cfg(test)]
    pub(crate) fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}
