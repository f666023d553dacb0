//! Shared test utilities for the linkmirror test suite.
//!
//! Provides scratch source/destination trees and a scripted [`Filesystem`]
//! that fails selected operations, so walker tests can exercise failure
//! isolation without touching real permissions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tree = setup_tree(&["a.txt", "sub/b.txt"]);
//! let settings = tree.settings("http://x/");
//! let fs = ScriptedFs::new().fail_symlink("a.txt");
//! let walked = Walker::new(&fs, &settings).walk_root("home", log).unwrap();
//! ```

use crate::fsys::{Filesystem, LocalFs};
use crate::render::SiteOptions;
use crate::types::{EntryDescriptor, EntryKind};
use crate::walk::WalkSettings;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const EACCES: i32 = 13;

// =========================================================================
// Fixture setup
// =========================================================================

/// A scratch tree: `<tmp>/src/home` to mirror into `<tmp>/dst`.
pub struct TestTree {
    pub tmp: TempDir,
}

impl TestTree {
    pub fn src_root(&self) -> PathBuf {
        self.tmp.path().join("src/home")
    }

    pub fn dst_root(&self) -> PathBuf {
        self.tmp.path().join("dst/home")
    }

    /// Walk settings mirroring `src/home` into `dst`.
    pub fn settings(&self, web_root: &str) -> WalkSettings {
        WalkSettings {
            source_base: self.tmp.path().join("src"),
            source_real: std::fs::canonicalize(self.src_root()).unwrap(),
            destination: self.tmp.path().join("dst"),
            web_root: web_root.to_string(),
            index_name: "index.html".to_string(),
            encode_dir_names: true,
            site: SiteOptions {
                site_name: "Test".to_string(),
                web_root: web_root.to_string(),
                index_name: "index.html".to_string(),
                stylesheets: vec![],
                scripts: vec![],
            },
        }
    }
}

/// Create `src/home` containing the given relative file paths.
///
/// Parent directories are created as needed; each file holds its own path.
pub fn setup_tree(files: &[&str]) -> TestTree {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("src/home");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::create_dir_all(tmp.path().join("dst")).unwrap();
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, file).unwrap();
    }
    TestTree { tmp }
}

pub fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

// =========================================================================
// Scripted filesystem
// =========================================================================

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// [`LocalFs`] with scripted failures, matched by file name.
#[derive(Default)]
pub struct ScriptedFs {
    fail_symlink: Vec<String>,
    fail_create_dir: Vec<String>,
    fail_list: Vec<String>,
    preexisting_index: Vec<String>,
    inject_other: Vec<(String, String)>,
}

impl ScriptedFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creating a link named `name` fails with a permission error.
    pub fn fail_symlink(mut self, name: &str) -> Self {
        self.fail_symlink.push(name.to_string());
        self
    }

    /// Creating a destination directory named `dir` fails with a permission error.
    pub fn fail_create_dir(mut self, dir: &str) -> Self {
        self.fail_create_dir.push(dir.to_string());
        self
    }

    /// Listing a directory named `dir` fails with a permission error.
    pub fn fail_list(mut self, dir: &str) -> Self {
        self.fail_list.push(dir.to_string());
        self
    }

    /// Writing the index inside a directory named `dir` hits a conflict.
    pub fn preexisting_index(mut self, dir: &str) -> Self {
        self.preexisting_index.push(dir.to_string());
        self
    }

    /// Listing a directory named `dir` also reports an unsupported entry.
    pub fn inject_other(mut self, dir: &str, name: &str) -> Self {
        self.inject_other.push((dir.to_string(), name.to_string()));
        self
    }
}

impl Filesystem for ScriptedFs {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<EntryDescriptor>> {
        let dir = file_name(path);
        if self.fail_list.contains(&dir) {
            return Err(io::Error::from_raw_os_error(EACCES));
        }
        let mut entries = LocalFs.list_dir(path)?;
        for (target, name) in &self.inject_other {
            if *target == dir {
                entries.push(EntryDescriptor::new(name.clone(), EntryKind::Other));
            }
        }
        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        if self.fail_create_dir.contains(&file_name(path)) {
            return Err(io::Error::from_raw_os_error(EACCES));
        }
        LocalFs.create_dir(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        if self.fail_symlink.contains(&file_name(link)) {
            return Err(io::Error::from_raw_os_error(EACCES));
        }
        LocalFs.symlink(target, link)
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

    fn write_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path.parent().map(file_name).unwrap_or_default();
        if self.preexisting_index.contains(&parent) {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        LocalFs.write_new(path, contents)
    }
}
