//! Configuration options for mirror operations.
//!
//! This module provides [`MirrorOptions`] for configuring a mirror run and
//! [`DigestMode`] for choosing how much of a file the change detector looks at.
//!
//! # Example
//!
//! ```
//! use treemirror::{DigestMode, MirrorOptions};
//!
//! let options = MirrorOptions::default()
//!     .with_parallel(8)
//!     .with_digest(DigestMode::Full)
//!     .with_max_depth(64);
//! ```

/// How much file content feeds the change-detection fingerprint.
///
/// Both modes XOR-fold bytes into an 8-byte accumulator, which is a weak
/// heuristic: equal-sized files whose bytes are rearranged within the same
/// position class modulo 8 produce the same fingerprint.
///
/// # Default
///
/// The default is [`DigestMode::Full`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DigestMode {
    /// Fold the whole file stream.
    #[default]
    Full,
    /// Fold only the first pointer-width bytes of the file.
    ///
    /// Cheaper on large files, but files of equal size that differ only
    /// past the prefix are reported as unchanged and are not re-copied.
    Prefix,
}

/// Options for mirror operations.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `parallel` | 16 | Worker threads in the pool |
/// | `digest` | `Full` | Fingerprint the whole file |
/// | `block_size` | 8192 | Bytes per read/write block |
/// | `fsync` | `true` | Sync files to disk after writing |
/// | `max_depth` | `None` | No depth limit |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MirrorOptions {
    /// Number of pool threads running directory workers (default: 16)
    ///
    /// Workers beyond this number queue until a thread frees up.
    pub parallel: usize,

    /// Change-detection fingerprint coverage
    pub digest: DigestMode,

    /// Size of the buffer used to stream and fingerprint files (default: 8192)
    pub block_size: usize,

    /// Whether to sync destination files to disk after writing (default: true)
    ///
    /// Without it, write errors the filesystem defers until writeback go
    /// unreported.
    pub fsync: bool,

    /// Maximum directory depth below the roots (default: None = unlimited)
    ///
    /// A worker that would visit a directory deeper than this fails with
    /// [`Error::MaxDepthExceeded`](crate::Error::MaxDepthExceeded).
    pub max_depth: Option<usize>,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    /// Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,

    /// Callback for per-entry progress notes (optional)
    ///
    /// Falls back to `tracing::debug!` when the `tracing` feature is enabled.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub verbose_handler: Option<fn(&str)>,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            parallel: 16,
            digest: DigestMode::Full,
            block_size: 8192,
            fsync: true,
            max_depth: None,
            warn_handler: None,
            verbose_handler: None,
        }
    }
}

impl MirrorOptions {
    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Create options with a verbose handler
    #[must_use]
    pub fn with_verbose_handler(mut self, handler: fn(&str)) -> Self {
        self.verbose_handler = Some(handler);
        self
    }

    /// Set the number of pool threads
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_parallel(mut self, n: usize) -> Self {
        self.parallel = n.max(1);
        self
    }

    /// Set the fingerprint coverage
    #[must_use]
    pub fn with_digest(mut self, digest: DigestMode) -> Self {
        self.digest = digest;
        self
    }

    /// Set the transfer block size
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_block_size(mut self, bytes: usize) -> Self {
        self.block_size = bytes.max(1);
        self
    }

    /// Disable fsync for faster (but less durable) mirroring
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Set maximum directory depth
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }

    pub(crate) fn verbose(&self, msg: &str) {
        if let Some(handler) = self.verbose_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("{}", msg);
        }
    }
}
