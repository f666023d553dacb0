//! The recursive directory walker.
//!
//! For one directory the walker goes through a fixed sequence, visiting each
//! directory exactly once:
//!
//! ```text
//! create destination dir → list source → fan out entries → fan in → render → return
//! ```
//!
//! ## Fan-out and fan-in
//!
//! Entries are processed with rayon's `par_iter`; subdirectories recurse
//! inside the same pool. `collect` re-associates results by listing position,
//! so the index entries and log lines come out in listing order no matter
//! which entry finishes first. The destination directory is created before
//! any entry runs, since every entry writes into it.
//!
//! ## Failure boundaries
//!
//! - File and symlink failures are isolated per entry (see [`crate::entry`]).
//! - A directory that cannot be created, listed or have its index written
//!   becomes a broken `dir` ref in its parent.
//! - An unsupported entry kind is [`WalkError::UnsupportedEntry`] and aborts
//!   every directory above it.
//!
//! The index write is joined before the directory returns, so its outcome is
//! part of the directory's own result.

use crate::entry::{self, DirScope, EntryClass};
use crate::fsys::Filesystem;
use crate::naming::{encode_component, join_url, join_url_all};
use crate::nav;
use crate::output::{self, LogContext};
use crate::render::{IndexLocals, IndexTemplate, SiteOptions, render_index};
use crate::types::{
    EntryDescriptor, EntryKind, Failure, LogFragment, PathContext, WalkStats, WebRef, WebRefKind,
    Walked,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Unsupported {kind} entry: {path}")]
    UnsupportedEntry { path: PathBuf, kind: EntryKind },
}

/// Fixed inputs of one walk.
#[derive(Debug, Clone)]
pub struct WalkSettings {
    /// Directory containing the tree root.
    pub source_base: PathBuf,
    /// Canonical path of the tree root. Directory links resolving inside it
    /// are mirrored relative, everything else to its canonical target.
    pub source_real: PathBuf,
    /// Directory the mirrored tree root is created in.
    pub destination: PathBuf,
    pub web_root: String,
    pub index_name: String,
    /// Percent-encode each directory's own name in its web path.
    pub encode_dir_names: bool,
    pub site: SiteOptions,
}

impl WalkSettings {
    fn source_tree(&self, parents: &[String]) -> PathBuf {
        join_all(&self.source_base, parents)
    }

    fn destination_tree(&self, parents: &[String]) -> PathBuf {
        join_all(&self.destination, parents)
    }

    /// Web URL of `dir_name` below `parents`, without a trailing slash.
    pub fn web_tree(&self, dir_name: &str, parents: &[String]) -> String {
        let encoded: Vec<String> = parents.iter().map(|p| encode_component(p)).collect();
        let context = join_url_all(&self.web_root, encoded.iter().map(String::as_str));
        if self.encode_dir_names {
            join_url(&context, &encode_component(dir_name))
        } else {
            join_url(&context, dir_name)
        }
    }
}

fn join_all(base: &Path, names: &[String]) -> PathBuf {
    names.iter().fold(base.to_path_buf(), |path, name| path.join(name))
}

/// Walks a source tree into a destination tree through a [`Filesystem`].
pub struct Walker<'a, F: Filesystem + ?Sized> {
    fs: &'a F,
    settings: &'a WalkSettings,
}

impl<'a, F: Filesystem + ?Sized> Walker<'a, F> {
    pub fn new(fs: &'a F, settings: &'a WalkSettings) -> Self {
        Self { fs, settings }
    }

    /// Walk the tree root with empty context and the top-level template.
    pub fn walk_root(&self, dir_name: &str, log: LogContext) -> Result<Walked, WalkError> {
        self.walk_dir(dir_name, &PathContext::root(), log, IndexTemplate::TopLevel)
    }

    /// Walk a directory below the root.
    ///
    /// `ctx` holds `dir_name`'s ancestors and the subdirectories of its parent.
    pub fn walk(
        &self,
        dir_name: &str,
        ctx: &PathContext,
        log: LogContext,
    ) -> Result<Walked, WalkError> {
        self.walk_dir(dir_name, ctx, log, IndexTemplate::Subtree)
    }

    fn walk_dir(
        &self,
        dir_name: &str,
        ctx: &PathContext,
        log: LogContext,
        template: IndexTemplate,
    ) -> Result<Walked, WalkError> {
        let settings = self.settings;
        let mut next_parents = ctx.parents.clone();
        next_parents.push(dir_name.to_string());
        let src_tree = settings.source_tree(&next_parents);
        let dst_tree = settings.destination_tree(&next_parents);
        let web_tree = settings.web_tree(dir_name, &ctx.parents);

        log::debug!("walking {}", src_tree.display());

        if let Err(err) = self.fs.create_dir(&dst_tree) {
            return Ok(broken_dir(dir_name, ctx, &dst_tree, log, &err));
        }
        let entries = match self.fs.list_dir(&src_tree) {
            Ok(entries) => entries,
            Err(err) => return Ok(broken_dir(dir_name, ctx, &src_tree, log, &err)),
        };

        let subdirs: Vec<String> = entries
            .iter()
            .filter(|e| {
                e.kind == EntryKind::Directory && !e.lossy_name && e.name != settings.index_name
            })
            .map(|e| e.name.clone())
            .collect();
        let child_ctx = ctx.child(dir_name, subdirs);
        let scope = DirScope {
            src_tree: &src_tree,
            dst_tree: &dst_tree,
            tree_real: &settings.source_real,
            web_tree: &web_tree,
            ctx: &child_ctx,
            log: log.deeper(),
        };

        let results: Vec<Walked> = entries
            .par_iter()
            .map(|entry| self.process_entry(entry, &scope))
            .collect::<Result<_, _>>()?;

        let mut stats = WalkStats {
            directories: 1,
            ..WalkStats::default()
        };
        let mut dir_refs: Vec<WebRef> = Vec::with_capacity(results.len());
        let mut logs: Vec<LogFragment> = Vec::with_capacity(results.len());
        let mut failures: Vec<Failure> = Vec::new();
        for walked in results {
            stats.merge(walked.stats);
            dir_refs.extend(walked.web_ref);
            logs.push(walked.log);
            failures.extend(walked.failures);
        }

        let breadcrumbs = nav::breadcrumbs(&settings.web_root, &ctx.parents, &settings.index_name);
        let nav_refs = nav::nav_refs(
            &nav::web_context(&settings.web_root, &ctx.parents),
            dir_name,
            &ctx.siblings,
            &settings.index_name,
        );
        let locals = IndexLocals {
            dir_name,
            breadcrumbs: &breadcrumbs,
            nav_refs: &nav_refs,
            dir_refs: &dir_refs,
            site: &settings.site,
        };
        let html = render_index(template, &locals).into_string();
        let index_path = dst_tree.join(&settings.index_name);

        let web_ref = match self.fs.write_new(&index_path, html.as_bytes()) {
            Ok(()) => WebRef::new(
                WebRefKind::Dir,
                join_url(&web_tree, &settings.index_name),
                dir_name,
            ),
            Err(err) => {
                log::warn!("{}: {}", index_path.display(), err);
                logs.push(output::format_broken_line(
                    log.deeper(),
                    &settings.index_name,
                    &err,
                ));
                stats.broken += 1;
                failures.push(Failure {
                    path: child_ctx.path_of(&settings.index_name),
                    error: err.to_string(),
                });
                WebRef::broken(WebRefKind::Dir, dir_name)
            }
        };

        let header = output::format_dir_header(log, dir_name, &ctx.parents, &ctx.siblings);
        Ok(Walked {
            web_ref: Some(web_ref),
            log: LogFragment::block(header, logs),
            stats,
            failures,
        })
    }

    fn process_entry(&self, entry: &EntryDescriptor, scope: &DirScope) -> Result<Walked, WalkError> {
        let index_name = &self.settings.index_name;
        match entry::classify(entry, index_name) {
            EntryClass::Index => Ok(entry::index_marker(&entry.name, scope)),
            EntryClass::File => Ok(entry::process_file(self.fs, &entry.name, scope)),
            EntryClass::Symlink => Ok(entry::process_symlink(
                self.fs,
                &entry.name,
                index_name,
                scope,
            )),
            EntryClass::Directory => self.walk(&entry.name, scope.ctx, scope.log),
            EntryClass::InvalidName => Ok(entry::invalid_name(entry, scope)),
            EntryClass::Other => Err(WalkError::UnsupportedEntry {
                path: scope.src_tree.join(&entry.name),
                kind: entry.kind,
            }),
        }
    }
}

fn broken_dir(
    name: &str,
    ctx: &PathContext,
    path: &Path,
    log: LogContext,
    err: &std::io::Error,
) -> Walked {
    entry::broken(WebRefKind::Dir, name, ctx.path_of(name), path, log, err)
}
