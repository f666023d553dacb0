//! Shared types flowing through the walk.
//!
//! Context travels down the recursion ([`PathContext`], by value); results
//! travel back up ([`Walked`]: a [`WebRef`], a [`LogFragment`] and the
//! subtree's [`WalkStats`]). Nothing here is shared mutably between sibling
//! entries.

use serde::Serialize;
use std::fmt;

/// Kind of a filesystem entry as reported by a directory listing.
///
/// Decided once per entry from the listing's file type (which does not follow
/// symlinks). The index marker is not a listing kind; it is recognised by name
/// in [`crate::entry::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Symlink,
    Directory,
    Other,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::File => "file",
            EntryKind::Symlink => "symlink",
            EntryKind::Directory => "directory",
            EntryKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// One entry from a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    pub name: String,
    pub kind: EntryKind,
    /// The on-disk name was not valid UTF-8; `name` holds replacement
    /// characters and cannot be used to reach the entry.
    pub lossy_name: bool,
}

impl EntryDescriptor {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            lossy_name: false,
        }
    }

    /// An entry whose name had to be lossily converted to UTF-8.
    pub fn lossy(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            lossy_name: true,
            ..Self::new(name, kind)
        }
    }
}

/// Ancestor trail and sibling set of the directory being walked.
///
/// `parents` runs from the tree root down to the current directory's parent;
/// `siblings` lists the subdirectories at the current level in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathContext {
    pub parents: Vec<String>,
    pub siblings: Vec<String>,
}

impl PathContext {
    /// Context for the tree root: no ancestors, no siblings.
    pub fn root() -> Self {
        Self::default()
    }

    /// Context for a child of `dir_name`, whose siblings are `subdirs`.
    pub fn child(&self, dir_name: &str, subdirs: Vec<String>) -> Self {
        let mut parents = self.parents.clone();
        parents.push(dir_name.to_string());
        Self {
            parents,
            siblings: subdirs,
        }
    }

    /// Recursion depth (0 at the root).
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// `/`-separated path of `name` from the tree root, root name included.
    pub fn path_of(&self, name: &str) -> String {
        let mut path = self.parents.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(name);
        path
    }
}

/// Kind of a rendered index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WebRefKind {
    Index,
    File,
    Link,
    Dir,
}

impl WebRefKind {
    /// CSS class suffix used by the index templates.
    pub fn css_class(self) -> &'static str {
        match self {
            WebRefKind::Index => "entry-index",
            WebRefKind::File => "entry-file",
            WebRefKind::Link => "entry-link",
            WebRefKind::Dir => "entry-dir",
        }
    }
}

/// Href used for entries that could not be processed.
pub const BROKEN_HREF: &str = "#";

/// A navigable reference to one entry in a directory index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebRef {
    pub kind: WebRefKind,
    pub href: String,
    pub title: String,
}

impl WebRef {
    pub fn new(kind: WebRefKind, href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind,
            href: href.into(),
            title: title.into(),
        }
    }

    /// Placeholder for an entry whose processing failed.
    pub fn broken(kind: WebRefKind, name: &str) -> Self {
        Self {
            kind,
            href: BROKEN_HREF.to_string(),
            title: format!("BROKEN {name}"),
        }
    }

    pub fn is_broken(&self) -> bool {
        self.href == BROKEN_HREF
    }
}

/// One ancestor in the breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Cumulative URL prefix; the next breadcrumb extends it.
    pub base: String,
    pub href: String,
    pub title: String,
}

/// One sibling directory in the level navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavRef {
    pub href: String,
    pub title: String,
    pub active: bool,
}

/// A formatted piece of the progress log: one line for a leaf entry or a
/// multi-line block for a whole subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFragment(String);

impl LogFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Join a header line and child fragments, one per line, in order.
    pub fn block(header: String, children: impl IntoIterator<Item = LogFragment>) -> Self {
        let mut text = header;
        for child in children {
            text.push('\n');
            text.push_str(&child.0);
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }
}

impl fmt::Display for LogFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry counts aggregated up the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories: usize,
    pub files: usize,
    pub links: usize,
    pub broken: usize,
}

impl WalkStats {
    pub fn merge(&mut self, other: WalkStats) {
        self.directories += other.directories;
        self.files += other.files;
        self.links += other.links;
        self.broken += other.broken;
    }
}

/// An entry or directory that could not be mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Position in the tree, as from [`PathContext::path_of`].
    pub path: String,
    pub error: String,
}

/// Result of processing one entry or one whole directory.
#[derive(Debug, Clone)]
pub struct Walked {
    /// `None` only for the index marker.
    pub web_ref: Option<WebRef>,
    pub log: LogFragment,
    pub stats: WalkStats,
    /// Failures in this entry or subtree, in listing order.
    pub failures: Vec<Failure>,
}
