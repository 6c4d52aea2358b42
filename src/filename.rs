//! The filename/output-tree collaborator: everything the dispatcher and
//! writers need from the platform's path handling, behind a narrow trait
//! so tests can substitute a fake without touching the filesystem.
//!
//! Out of scope for the core proper (per the external-interfaces split):
//! raw file I/O and platform-specific path manipulation are collaborator
//! concerns. This module is the one concrete implementation the binary
//! wires in; writers only ever see `&dyn Filenames`.

use std::io;
use std::path::{Path, PathBuf};

pub trait Filenames {
    /// Joins `name` onto `base`, as a single path segment.
    fn join(&self, base: &Path, name: &str) -> PathBuf;

    /// Returns `path` with its extension replaced by `ext`.
    fn with_extension(&self, path: &Path, ext: &str) -> PathBuf;

    /// Creates `path` and every missing ancestor directory.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// The relative path from `base` to `target`, for the links one
    /// emitted file writes to another.
    fn relative_from(&self, target: &Path, base: &Path) -> PathBuf;
}

/// The default implementation, backed by `std::path` and `pathdiff`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFilenames;

impl Filenames for StdFilenames {
    fn join(&self, base: &Path, name: &str) -> PathBuf {
        base.join(name)
    }

    fn with_extension(&self, path: &Path, ext: &str) -> PathBuf {
        path.with_extension(ext)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn relative_from(&self, target: &Path, base: &Path) -> PathBuf {
        pathdiff::diff_paths(target, base).unwrap_or_else(|| target.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_appends_a_single_segment() {
        let f = StdFilenames;
        assert_eq!(f.join(Path::new("out"), "chapter1.txt"), Path::new("out/chapter1.txt"));
    }

    #[test]
    fn with_extension_replaces_the_suffix() {
        let f = StdFilenames;
        assert_eq!(f.with_extension(Path::new("out/page.html"), "txt"), Path::new("out/page.txt"));
    }

    #[test]
    fn relative_from_computes_a_sibling_path() {
        let f = StdFilenames;
        let rel = f.relative_from(Path::new("out/chapter2/index.html"), Path::new("out/chapter1"));
        assert_eq!(rel, Path::new("../chapter2/index.html"));
    }
}
