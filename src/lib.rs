//! # linkmirror
//!
//! Mirrors a source directory tree into a destination tree of symbolic links
//! and writes a navigable static HTML index into every mirrored directory:
//! a breadcrumb trail, links to sibling directories, and one entry per item.
//! A tree-shaped progress log of the walk is produced alongside.
//!
//! # Architecture: One Concurrent Walk
//!
//! ```text
//! driver    prepare destination → stage assets → walk root
//! walk      per directory: mkdir → list → fan out (rayon) → fan in → render → return
//! entry     per entry: classify → link file / resolve symlink / recurse / fail
//! ```
//!
//! Data flows down (ancestors, siblings, log depth) while the recursion fans
//! out, and back up (web refs, log fragments, counts) while it fans in. No
//! component mutates shared state; each directory writes only into its own
//! destination subtree, so concurrent siblings never touch the same path.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`walk`] | The recursive walker: fan-out, ordered fan-in, index write |
//! | [`entry`] | Entry classification and per-entry processors with failure isolation |
//! | [`nav`] | Breadcrumb trail and sibling navigation (pure) |
//! | [`render`] | Index page templates using Maud |
//! | [`driver`] | Destination cleanup, asset staging, thread pool, root walk |
//! | [`fsys`] | Filesystem trait with real and dry-run implementations |
//! | [`config`] | Layered TOML configuration with validation |
//! | [`naming`] | Percent-encoding and URL/path joining |
//! | [`output`] | Progress log formatting |
//! | [`types`] | Shared data model |
//!
//! # Design Decisions
//!
//! ## Broken Entries Instead of Errors
//!
//! A file that cannot be linked or a symlink that dangles becomes a `BROKEN`
//! entry with href `#` and a diagnostic log line. The enclosing directory
//! still gets its index and its siblings are still processed. A directory
//! that cannot be created or listed is handled the same way one level up.
//! Only entry kinds the mirror has no representation for (sockets, FIFOs,
//! devices) abort the walk.
//!
//! ## Ordered Fan-In
//!
//! Entries run in parallel, but results are collected by listing position.
//! Index pages and logs are therefore identical from run to run for the same
//! tree, whatever order the filesystem calls complete in.
//!
//! ## Bounded Parallelism
//!
//! The walk runs inside a dedicated rayon pool sized by
//! `processing.max_processes`, so a directory with thousands of entries
//! queues work rather than opening thousands of concurrent operations.

pub mod config;
pub mod driver;
pub mod entry;
pub mod fsys;
pub mod naming;
pub mod nav;
pub mod output;
pub mod render;
pub mod types;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
