//! Top-level run: prepare the destination, stage assets, walk the tree.
//!
//! ```text
//! 1. Prepare   destination/   deleted, verified gone, recreated
//! 2. Stage     assets/        matching files copied into destination/
//! 3. Walk      source/        mirrored into destination/<root name>/
//! ```
//!
//! Steps 1 and 2 finish before the walk starts: the walker writes into the
//! same destination tree and does not coordinate with late asset copies.
//! Dry runs skip both and walk through [`DryRunFs`](crate::fsys::DryRunFs).
//!
//! The root is named after the configured source's last component, even
//! when that component is a symlink to a differently named directory.

use crate::config::{self, ConfigError, SiteConfig};
use crate::fsys::Filesystem;
use crate::naming::{encode_segments, join_url};
use crate::output::LogContext;
use crate::render::SiteOptions;
use crate::types::Walked;
use crate::walk::{WalkError, WalkSettings, Walker};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Walk aborted: {0}")]
    Walk(#[from] WalkError),
    #[error("Asset staging failed: {0}")]
    Assets(#[from] walkdir::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Destination still present after cleanup: {0}")]
    CleanupIncomplete(PathBuf),
    #[error("Source is not a directory: {0}")]
    MissingSource(PathBuf),
}

/// Whether the run touches the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Clean, stage, and write the mirror.
    Build,
    /// Walk and report only.
    DryRun,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct BuildReport {
    /// The root directory's result: its ref, the full log and totals.
    pub root: Walked,
    /// Staged asset paths relative to the destination, sorted.
    pub staged_assets: Vec<PathBuf>,
}

/// Delete the destination tree if present, verify it is gone, recreate it.
pub fn prepare_destination(destination: &Path) -> Result<(), DriverError> {
    if fs::symlink_metadata(destination).is_ok() {
        log::info!("removing {}", destination.display());
        fs::remove_dir_all(destination)?;
    }
    if fs::symlink_metadata(destination).is_ok() {
        return Err(DriverError::CleanupIncomplete(destination.to_path_buf()));
    }
    fs::create_dir_all(destination)?;
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// Copy every file below `assets` whose extension is listed into `destination`.
///
/// Relative paths are preserved. Returns the staged relative paths, sorted.
pub fn stage_assets(
    assets: &Path,
    destination: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, DriverError> {
    let mut staged = Vec::new();
    for entry in WalkDir::new(assets).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(assets) else {
            continue;
        };
        let target = destination.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        log::debug!("staged {}", rel.display());
        staged.push(rel.to_path_buf());
    }
    staged.sort();
    Ok(staged)
}

/// Site options with staged stylesheets and scripts linked from every page.
pub fn site_options(config: &SiteConfig, staged: &[PathBuf]) -> SiteOptions {
    let href = |rel: &PathBuf| {
        let text = crate::naming::link_text(rel);
        join_url(&config.web_root, &encode_segments(&text))
    };
    let with_ext = |ext: &str| -> Vec<String> {
        staged
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext)))
            .map(href)
            .collect()
    };
    SiteOptions {
        site_name: config.site_name.clone(),
        web_root: config.web_root.clone(),
        index_name: config.index_name.clone(),
        stylesheets: with_ext("css"),
        scripts: with_ext("js"),
    }
}

/// Where the tree root lives.
#[derive(Debug)]
struct SourceRoot {
    /// Canonical directory containing the root.
    base: PathBuf,
    /// Root name as configured, so a symlinked source keeps its own name.
    name: String,
    /// Canonical path of the root itself.
    real: PathBuf,
}

fn locate_source(source: &Path) -> Result<SourceRoot, DriverError> {
    let missing = || DriverError::MissingSource(source.to_path_buf());
    let real = fs::canonicalize(source).map_err(|_| missing())?;
    if !real.is_dir() {
        return Err(missing());
    }
    let configured = source.file_name().and_then(|name| name.to_str());
    let (base, name) = match configured {
        Some(name) => {
            let parent = match source.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let base = fs::canonicalize(parent).map_err(|_| missing())?;
            (base, name.to_string())
        }
        // `.`, `..` or `/`: fall back to the resolved path's own name
        None => match (real.parent(), real.file_name().and_then(|n| n.to_str())) {
            (Some(base), Some(name)) => (base.to_path_buf(), name.to_string()),
            _ => return Err(missing()),
        },
    };
    Ok(SourceRoot { base, name, real })
}

/// Run one full walk against `fs`.
pub fn run<F: Filesystem + ?Sized>(
    config: &SiteConfig,
    fs_impl: &F,
    mode: RunMode,
) -> Result<BuildReport, DriverError> {
    let source = locate_source(&config.source)?;

    let staged_assets = match mode {
        RunMode::Build => {
            prepare_destination(&config.destination)?;
            match &config.assets.source {
                Some(assets) => {
                    log::info!("staging assets from {}", assets.display());
                    stage_assets(assets, &config.destination, &config.assets.extensions)?
                }
                None => Vec::new(),
            }
        }
        RunMode::DryRun => Vec::new(),
    };

    let settings = WalkSettings {
        source_base: source.base,
        source_real: source.real,
        destination: config.destination.clone(),
        web_root: config.web_root.clone(),
        index_name: config.index_name.clone(),
        encode_dir_names: config.encode_dir_names,
        site: site_options(config, &staged_assets),
    };

    let threads = config::effective_threads(&config.processing);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    log::info!("walking {} with {} threads", source.name, threads);

    let walker = Walker::new(fs_impl, &settings);
    let root = pool.install(|| walker.walk_root(&source.name, LogContext::new(config.verbosity)))?;

    Ok(BuildReport {
        root,
        staged_assets,
    })
}
