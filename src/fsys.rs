//! Filesystem collaborator used by the walker.
//!
//! The [`Filesystem`] trait lists every primitive the walk needs so the rest
//! of the codebase is I/O-agnostic. [`LocalFs`] does the real work;
//! [`DryRunFs`] reads the real source tree but turns every write into a
//! successful no-op, which is what `check` runs on.
//!
//! Every call is fallible and may block; callers decide whether a failure is
//! entry-local, directory-local or fatal.

use crate::types::{EntryDescriptor, EntryKind};
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

/// Permission bits for mirrored directories.
pub const DIR_MODE: u32 = 0o755;
/// Permission bits for written index files.
pub const FILE_MODE: u32 = 0o644;

/// Filesystem primitives consumed by the walker.
///
/// `Sync` because one instance is shared across rayon workers.
pub trait Filesystem: Sync {
    /// List a directory's entries with their kinds (symlinks not followed).
    fn list_dir(&self, path: &Path) -> io::Result<Vec<EntryDescriptor>>;

    /// Create one directory with [`DIR_MODE`]. Fails if it already exists.
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Read the raw target text of a symbolic link.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Resolve a path to its canonical absolute form, following every link.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Stat `path` (following links) and report whether it is a directory.
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Create `path` exclusively and write `contents` with [`FILE_MODE`].
    ///
    /// An existing file is a conflict (`AlreadyExists`), never overwritten.
    fn write_new(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Real filesystem access.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<EntryDescriptor>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_symlink() {
                EntryKind::Symlink
            } else if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::Other
            };
            entries.push(match entry.file_name().into_string() {
                Ok(name) => EntryDescriptor::new(name, kind),
                Err(raw) => EntryDescriptor::lossy(raw.to_string_lossy(), kind),
            });
        }
        // read_dir order is filesystem-dependent
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        DirBuilder::new().mode(DIR_MODE).create(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.is_dir())
    }

    fn write_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(FILE_MODE)
            .open(path)?;
        file.write_all(contents)
    }
}

/// Reads through to [`LocalFs`]; every write succeeds without touching disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunFs;

impl Filesystem for DryRunFs {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<EntryDescriptor>> {
        LocalFs.list_dir(path)
    }

    fn create_dir(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn symlink(&self, _target: &Path, _link: &Path) -> io::Result<()> {
        Ok(())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        LocalFs.read_link(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        LocalFs.canonicalize(path)
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        LocalFs.is_dir(path)
    }

    fn write_new(&self, _path: &Path, _contents: &[u8]) -> io::Result<()> {
        Ok(())
    }
}
