//! Progress log formatting.
//!
//! # Tree-Shaped Log
//!
//! The walk produces one [`LogFragment`] per entry and assembles them into a
//! block per directory, mirroring the source tree:
//!
//! ```text
//! home/  | []
//!     a.txt
//!     latest -> releases/v2
//!     index.html (index)
//!     sub/ home | [sub, zzz]
//!         b.txt
//!         BROKEN c.txt: Permission denied (os error 13)
//!     zzz/ home | [sub, zzz]
//! Mirrored 3 directories, 2 files, 1 link (1 broken)
//! ```
//!
//! Quiet output drops the tree and prints each failure with its full
//! position instead:
//!
//! ```text
//! BROKEN home/sub/c.txt: Permission denied (os error 13)
//! Mirrored 3 directories, 2 files, 1 link (1 broken)
//! ```
//!
//! # Architecture
//!
//! Formatting is pure: the `format_*` functions return strings and never
//! print. [`LogContext`] is an immutable value handed down the recursion;
//! [`LogContext::deeper`] returns a new one, so concurrent siblings never
//! share an indentation counter. [`print_walk_output`] is the only function
//! that writes to stdout.

use crate::types::{Failure, LogFragment, WalkStats, Walked};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

/// How much of the walk to report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Summary and failures only.
    Quiet,
    /// The full tree.
    #[default]
    Normal,
    /// The full tree plus link targets.
    Verbose,
}

impl Verbosity {
    /// Default `log` filter for this verbosity; `RUST_LOG` takes precedence.
    pub fn log_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Error,
            Verbosity::Normal => log::LevelFilter::Warn,
            Verbosity::Verbose => log::LevelFilter::Debug,
        }
    }
}

/// Indentation depth and verbosity for one point in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogContext {
    pub depth: usize,
    pub verbosity: Verbosity,
}

impl LogContext {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            depth: 0,
            verbosity,
        }
    }

    /// Same context one level further down.
    pub fn deeper(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    fn pad(&self, text: &str) -> String {
        format!("{}{}", indent(self.depth), text)
    }
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Header line for a directory block.
///
/// ```text
/// sub/ home --> docs | [sub, zzz]
/// ```
pub fn format_dir_header(
    ctx: LogContext,
    name: &str,
    parents: &[String],
    siblings: &[String],
) -> String {
    ctx.pad(&format!(
        "{}/ {} | [{}]",
        name,
        parents.join(" --> "),
        siblings.join(", ")
    ))
}

/// A mirrored regular file. Verbose output shows where the link points.
pub fn format_file_line(ctx: LogContext, name: &str, target: &Path) -> LogFragment {
    if ctx.verbosity >= Verbosity::Verbose {
        LogFragment::new(ctx.pad(&format!("{} => {}", name, target.display())))
    } else {
        LogFragment::new(ctx.pad(name))
    }
}

/// A mirrored symbolic link with its relative target text.
pub fn format_link_line(ctx: LogContext, name: &str, relative: &str) -> LogFragment {
    LogFragment::new(ctx.pad(&format!("{name} -> {relative}")))
}

/// The index marker found in the source listing.
pub fn format_index_marker(ctx: LogContext, name: &str) -> LogFragment {
    LogFragment::new(ctx.pad(&format!("{name} (index)")))
}

/// Diagnostic line for an entry or directory that could not be processed.
pub fn format_broken_line(ctx: LogContext, name: &str, error: &dyn Display) -> LogFragment {
    LogFragment::new(ctx.pad(&format!("BROKEN {name}: {error}")))
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// One-line summary of a finished walk.
pub fn format_summary(stats: &WalkStats) -> String {
    let mut line = format!(
        "Mirrored {}, {}, {}",
        count(stats.directories, "directory", "directories"),
        count(stats.files, "file", "files"),
        count(stats.links, "link", "links"),
    );
    if stats.broken > 0 {
        line.push_str(&format!(" ({} broken)", stats.broken));
    }
    line
}

/// A failure with its position from the tree root.
pub fn format_failure(failure: &Failure) -> String {
    format!("BROKEN {}: {}", failure.path, failure.error)
}

/// Lines to print for a finished walk at the given verbosity.
///
/// Quiet output replaces the tree with the recorded failures.
pub fn format_walk_output(walked: &Walked, verbosity: Verbosity) -> Vec<String> {
    let mut lines: Vec<String> = match verbosity {
        Verbosity::Quiet => walked.failures.iter().map(format_failure).collect(),
        _ => walked.log.lines().map(str::to_string).collect(),
    };
    lines.push(format_summary(&walked.stats));
    lines
}

/// Print walk output to stdout.
pub fn print_walk_output(walked: &Walked, verbosity: Verbosity) {
    for line in format_walk_output(walked, verbosity) {
        println!("{}", line);
    }
}
