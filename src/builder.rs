//! Builder API for mirror operations.
//!
//! [`MirrorBuilder`] wraps [`MirrorOptions`] in a fluent interface.
//!
//! # Examples
//!
//! ```no_run
//! use treemirror::MirrorBuilder;
//!
//! let stats = MirrorBuilder::new("src", "dst")
//!     .parallel(8)
//!     .no_fsync()
//!     .run()?;
//! println!("{} files copied", stats.files_copied());
//! # Ok::<(), treemirror::Error>(())
//! ```

use crate::error::Result;
use crate::mirror::{MirrorStats, mirror_dir};
use crate::options::{DigestMode, MirrorOptions};
use std::path::{Path, PathBuf};

/// A builder for configuring and executing a mirror operation.
///
/// # Example
///
/// ```no_run
/// use treemirror::MirrorBuilder;
///
/// let stats = MirrorBuilder::new("/data/project", "/backup/project")
///     .parallel(32)
///     .max_depth(100)
///     .run()?;
/// # Ok::<(), treemirror::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MirrorBuilder {
    src: PathBuf,
    dst: PathBuf,
    options: MirrorOptions,
}

impl MirrorBuilder {
    /// Create a builder for mirroring `src` into `dst` with default options.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            options: MirrorOptions::default(),
        }
    }

    /// Set the worker pool size.
    ///
    /// Default is 16. With 1, directory workers still exist but run one at a time.
    #[must_use]
    pub fn parallel(mut self, threads: usize) -> Self {
        self.options = self.options.with_parallel(threads);
        self
    }

    /// Choose how much of each file the content fingerprint covers.
    #[must_use]
    pub fn digest(mut self, digest: DigestMode) -> Self {
        self.options = self.options.with_digest(digest);
        self
    }

    /// Fingerprint only the first few bytes of each file.
    ///
    /// Shorthand for `.digest(DigestMode::Prefix)`. Faster on large trees,
    /// but a same-size change past the prefix goes unnoticed.
    #[must_use]
    pub fn prefix_digest(self) -> Self {
        self.digest(DigestMode::Prefix)
    }

    /// Set the block size used when reading and writing files.
    #[must_use]
    pub fn block_size(mut self, bytes: usize) -> Self {
        self.options = self.options.with_block_size(bytes);
        self
    }

    /// Disable fsync after writing files.
    ///
    /// This improves performance but reduces durability guarantees.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.options = self.options.without_fsync();
        self
    }

    /// Fail directory workers deeper than `depth` below the root.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options = self.options.with_max_depth(depth);
        self
    }

    /// Set a handler for warnings such as inaccessible files or failed workers.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use treemirror::MirrorBuilder;
    ///
    /// let stats = MirrorBuilder::new("src", "dst")
    ///     .on_warning(|msg| eprintln!("warning: {msg}"))
    ///     .run()?;
    /// # Ok::<(), treemirror::Error>(())
    /// ```
    #[must_use]
    pub fn on_warning(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Set a handler that receives one line per file decision.
    #[must_use]
    pub fn verbose(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_verbose_handler(handler);
        self
    }

    /// The options configured so far.
    pub fn options(&self) -> &MirrorOptions {
        &self.options
    }

    /// Run the mirror.
    ///
    /// # Errors
    ///
    /// Same as [`mirror_dir`].
    pub fn run(self) -> Result<MirrorStats> {
        mirror_dir(&self.src, &self.dst, &self.options)
    }
}
