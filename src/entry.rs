//! Entry classification and per-entry processing.
//!
//! Every listed entry is classified once into an [`EntryClass`] and handled
//! by the matching processor:
//!
//! | Class | Destination | WebRef |
//! |-------|-------------|--------|
//! | `Index` | nothing | none |
//! | `File` | symlink → canonical source path | `file`, `<web tree>/<encoded name>` |
//! | `Symlink` | symlink → relative text (dir inside the tree) or canonical target | `link`, encoded relative text |
//! | `Directory` | recursive walk | the subdirectory's own `dir` ref |
//! | `InvalidName` | nothing | broken ref of the listed kind |
//! | `Other` | fatal for the enclosing directory | - |
//!
//! File and symlink processors never fail: an I/O error becomes a broken
//! [`Walked`] (href `#`, title `BROKEN <name>`) plus a diagnostic log line
//! and a [`Failure`] record. Directories and unsupported kinds are
//! dispatched by the walker.

use crate::fsys::Filesystem;
use crate::naming::{encode_component, encode_segments, join_url, link_text, relative_path};
use crate::output::{self, LogContext};
use crate::types::{
    EntryDescriptor, EntryKind, Failure, PathContext, WalkStats, WebRef, WebRefKind, Walked,
};
use std::io;
use std::path::{Path, PathBuf};

/// What the walker does with one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// A previously rendered index page: skipped, logged.
    Index,
    File,
    Symlink,
    Directory,
    /// A file, link or directory whose name is not valid UTF-8.
    InvalidName,
    /// Sockets, FIFOs, devices.
    Other,
}

/// Classify an entry. The index name wins over the listing kind.
pub fn classify(entry: &EntryDescriptor, index_name: &str) -> EntryClass {
    if entry.name == index_name {
        return EntryClass::Index;
    }
    match entry.kind {
        EntryKind::Other => EntryClass::Other,
        _ if entry.lossy_name => EntryClass::InvalidName,
        EntryKind::File => EntryClass::File,
        EntryKind::Symlink => EntryClass::Symlink,
        EntryKind::Directory => EntryClass::Directory,
    }
}

/// Paths and context of the directory whose entries are being processed.
#[derive(Debug, Clone, Copy)]
pub struct DirScope<'s> {
    pub src_tree: &'s Path,
    pub dst_tree: &'s Path,
    /// Canonical path of the tree root.
    pub tree_real: &'s Path,
    /// URL of this directory, without a trailing slash.
    pub web_tree: &'s str,
    /// Context handed to subdirectories of this directory.
    pub ctx: &'s PathContext,
    /// Log context for this directory's entries.
    pub log: LogContext,
}

/// Broken placeholder for a failed entry or directory.
///
/// `at` is the failing item's position in the tree, `path` its filesystem
/// path for the diagnostic.
pub fn broken(
    kind: WebRefKind,
    name: &str,
    at: String,
    path: &Path,
    log: LogContext,
    err: &io::Error,
) -> Walked {
    log::warn!("{}: {}", path.display(), err);
    Walked {
        web_ref: Some(WebRef::broken(kind, name)),
        log: output::format_broken_line(log, name, err),
        stats: WalkStats {
            broken: 1,
            ..WalkStats::default()
        },
        failures: vec![Failure {
            path: at,
            error: err.to_string(),
        }],
    }
}

fn broken_entry(kind: WebRefKind, name: &str, scope: &DirScope, err: &io::Error) -> Walked {
    let path = scope.src_tree.join(name);
    broken(kind, name, scope.ctx.path_of(name), &path, scope.log, err)
}

/// An entry that cannot be addressed because its name is not valid UTF-8.
pub fn invalid_name(entry: &EntryDescriptor, scope: &DirScope) -> Walked {
    let kind = match entry.kind {
        EntryKind::Directory => WebRefKind::Dir,
        EntryKind::Symlink => WebRefKind::Link,
        _ => WebRefKind::File,
    };
    let err = io::Error::new(io::ErrorKind::InvalidData, "file name is not valid UTF-8");
    broken_entry(kind, &entry.name, scope, &err)
}

/// The index marker contributes only a log line.
pub fn index_marker(name: &str, scope: &DirScope) -> Walked {
    Walked {
        web_ref: None,
        log: output::format_index_marker(scope.log, name),
        stats: WalkStats::default(),
        failures: Vec::new(),
    }
}

/// Mirror a regular file as a symlink to its canonical source path.
pub fn process_file<F: Filesystem + ?Sized>(fs: &F, name: &str, scope: &DirScope) -> Walked {
    match link_file(fs, &scope.src_tree.join(name), &scope.dst_tree.join(name)) {
        Ok(target) => Walked {
            web_ref: Some(WebRef::new(
                WebRefKind::File,
                join_url(scope.web_tree, &encode_component(name)),
                name,
            )),
            log: output::format_file_line(scope.log, name, &target),
            stats: WalkStats {
                files: 1,
                ..WalkStats::default()
            },
            failures: Vec::new(),
        },
        Err(err) => broken_entry(WebRefKind::File, name, scope, &err),
    }
}

fn link_file<F: Filesystem + ?Sized>(fs: &F, src: &Path, dst: &Path) -> io::Result<PathBuf> {
    let target = fs.canonicalize(src)?;
    fs.symlink(&target, dst)?;
    Ok(target)
}

/// A source symlink resolved far enough to render and mirror it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// `/`-separated path from the link's directory to its target.
    pub relative: String,
    /// Canonical target path.
    pub real: PathBuf,
    pub is_dir: bool,
}

impl ResolvedLink {
    /// Href for the index entry. Directory targets point at their index page.
    pub fn href(&self, index_name: &str) -> String {
        let encoded = encode_segments(&self.relative);
        if self.is_dir {
            join_url(&encoded, index_name)
        } else {
            encoded
        }
    }

    /// What the mirrored link points at.
    ///
    /// A directory target inside the tree rooted at `tree_real` keeps its
    /// relative text so it lands on the mirrored directory. Anything else
    /// points at the canonical target, which the mirror does not contain.
    pub fn mirror_target(&self, tree_real: &Path) -> PathBuf {
        if self.is_dir && self.real.starts_with(tree_real) {
            PathBuf::from(&self.relative)
        } else {
            self.real.clone()
        }
    }
}

/// Resolve a source symlink's real target and relative text.
///
/// Relative link text is kept as written; an absolute one is rewritten
/// relative to the canonical directory holding the link.
pub fn resolve_link<F: Filesystem + ?Sized>(
    fs: &F,
    src_dir: &Path,
    name: &str,
) -> io::Result<ResolvedLink> {
    let link_path = src_dir.join(name);
    let raw = fs.read_link(&link_path)?;
    let real = fs.canonicalize(&link_path)?;
    let relative = if raw.is_relative() {
        link_text(&raw)
    } else {
        let here = fs.canonicalize(src_dir)?;
        link_text(&relative_path(&here, &real))
    };
    let is_dir = fs.is_dir(&real)?;
    Ok(ResolvedLink {
        relative,
        real,
        is_dir,
    })
}

/// Mirror a symbolic link and reference its target.
pub fn process_symlink<F: Filesystem + ?Sized>(
    fs: &F,
    name: &str,
    index_name: &str,
    scope: &DirScope,
) -> Walked {
    let linked = resolve_link(fs, scope.src_tree, name).and_then(|resolved| {
        fs.symlink(&resolved.mirror_target(scope.tree_real), &scope.dst_tree.join(name))?;
        Ok(resolved)
    });
    match linked {
        Ok(resolved) => Walked {
            web_ref: Some(WebRef::new(
                WebRefKind::Link,
                resolved.href(index_name),
                name,
            )),
            log: output::format_link_line(scope.log, name, &resolved.relative),
            stats: WalkStats {
                links: 1,
                ..WalkStats::default()
            },
            failures: Vec::new(),
        },
        Err(err) => broken_entry(WebRefKind::Link, name, scope, &err),
    }
}
