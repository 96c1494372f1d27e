//! Filesystem access used by the scanner and the availability check.
//!
//! The catalog only needs two capabilities: a recursive listing of the files
//! below a directory and an existence probe for a single path. Backends for
//! object stores or tape archives implement [`Filesystem`] outside this crate.

pub mod local;

pub use local::LocalFilesystem;

use std::io;

/// Listing and probing capability
pub trait Filesystem {
    /// List the files below `path` as `/` separated paths relative to it.
    ///
    /// Hidden entries (names starting with `.`) and everything below hidden
    /// directories are excluded. Without `recursive` only direct children
    /// are returned.
    fn list(&self, path: &str, recursive: bool) -> io::Result<Vec<String>>;

    /// Check whether a file exists
    fn exists(&self, path: &str) -> bool;
}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn list(&self, path: &str, recursive: bool) -> io::Result<Vec<String>> {
        (**self).list(path, recursive)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }
}
