//! Error types for treemirror.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur while mirroring a tree, and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Validation | [`Error::SourceNotFound`], [`Error::SourceNotADirectory`], [`Error::DestinationNotFound`], [`Error::DestinationNotADirectory`] |
//! | Traversal | [`Error::ReadDir`], [`Error::Metadata`], [`Error::MaxDepthExceeded`] |
//! | Destination setup | [`Error::CreateDir`], [`Error::SetPermissions`] |
//! | Transfer | [`Error::OpenSource`], [`Error::OpenDestination`], [`Error::Read`], [`Error::Write`] |
//! | Partial | [`Error::PartialMirror`] |
//!
//! Every error except [`Error::PartialMirror`] ends the worker that hit it.
//! Sibling workers keep running; the failure surfaces to the caller as
//! [`Error::PartialMirror`] once the whole tree has been joined.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for treemirror operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// # Example
///
/// ```
/// use std::io;
/// use treemirror::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        // ENOSPC
        if let Some(raw_error) = error.raw_os_error() {
            return raw_error == 28;
        }
    }

    #[cfg(windows)]
    {
        // ERROR_DISK_FULL
        if let Some(raw_error) = error.raw_os_error() {
            return raw_error == 112;
        }
    }

    false
}

/// Errors that can occur during a mirror operation.
///
/// Display output follows the `<message>: <path>` shape; the underlying OS
/// error, when there is one, is available through
/// [`std::error::Error::source`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Source root does not exist
    #[error("source directory does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Source root exists but is not a directory
    #[error("source is not a directory: {0}")]
    SourceNotADirectory(PathBuf),

    /// Destination root does not exist
    #[error("destination directory does not exist: {0}")]
    DestinationNotFound(PathBuf),

    /// Destination root exists but is not a directory
    #[error("destination is not a directory: {0}")]
    DestinationNotADirectory(PathBuf),

    /// Failed to open or iterate a source directory
    #[error("could not read directory: {path}")]
    ReadDir {
        /// Directory being read
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to stat an entry
    #[error("could not stat: {path}")]
    Metadata {
        /// Entry being inspected
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to create a destination directory
    #[error("could not create directory: {path}")]
    CreateDir {
        /// Directory being created
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to change permission bits on a destination entry
    #[error("could not change permissions: {path}")]
    SetPermissions {
        /// Entry whose mode was being changed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to open a source file
    #[error("could not open source file for reading: {path}")]
    OpenSource {
        /// Source file
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to open a destination file
    #[error("could not open destination file for writing: {path}")]
    OpenDestination {
        /// Destination file
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed while reading file content
    #[error("could not read file: {path}")]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed while writing, flushing or syncing a destination file
    #[error("could not write file: {path}")]
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Maximum directory depth exceeded
    #[error("maximum depth {max_depth} exceeded: {path}")]
    MaxDepthExceeded {
        /// The directory that would exceed the limit
        path: PathBuf,
        /// The configured maximum depth
        max_depth: usize,
    },

    /// One or more workers failed; everything else was mirrored
    #[error("{failed} of {workers} directory workers failed")]
    PartialMirror {
        /// Number of workers that ended with an error
        failed: u64,
        /// Number of workers that were started
        workers: u64,
        /// How many of the failures were caused by a full destination device
        out_of_space: u64,
    },
}

impl Error {
    /// The path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceNotFound(path)
            | Self::SourceNotADirectory(path)
            | Self::DestinationNotFound(path)
            | Self::DestinationNotADirectory(path)
            | Self::ReadDir { path, .. }
            | Self::Metadata { path, .. }
            | Self::CreateDir { path, .. }
            | Self::SetPermissions { path, .. }
            | Self::OpenSource { path, .. }
            | Self::OpenDestination { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::MaxDepthExceeded { path, .. } => Some(path.as_path()),
            Self::PartialMirror { .. } => None,
        }
    }

    /// Display text followed by the underlying cause, if any.
    #[must_use]
    pub fn full_message(&self) -> String {
        match std::error::Error::source(self) {
            Some(cause) => format!("{self}: {cause}"),
            None => self.to_string(),
        }
    }

    /// Whether the root arguments themselves were rejected.
    #[must_use]
    pub fn is_invalid_root(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound(_)
                | Self::SourceNotADirectory(_)
                | Self::DestinationNotFound(_)
                | Self::DestinationNotADirectory(_)
        )
    }

    /// Whether the underlying cause is a full destination device.
    ///
    /// For [`Error::PartialMirror`] this is true when at least one worker
    /// failed that way.
    #[must_use]
    pub fn is_no_space(&self) -> bool {
        match self {
            Self::CreateDir { source, .. }
            | Self::OpenDestination { source, .. }
            | Self::Write { source, .. } => is_no_space_error(source),
            Self::PartialMirror { out_of_space, .. } => *out_of_space > 0,
            _ => false,
        }
    }
}
