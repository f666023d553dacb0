//! Run configuration.
//!
//! Handles loading, validating, and merging configuration. Values come from
//! three layers, each overriding the one before:
//!
//! ```text
//! stock defaults  →  linkmirror.toml (or --config FILE)  →  command-line flags
//! ```
//!
//! Everything is read once before the walk starts and stays immutable for the
//! whole run.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source = "home"            # Directory to mirror; its name is the tree root
//! destination = "dist"       # Where the mirror is built (wiped on each build)
//! web_root = "/"             # URL prefix the destination is served under
//! index_name = "index.html"  # Name of the per-directory index page
//! site_name = "Mirror"       # Shown in page titles and the header
//! verbosity = "normal"       # quiet | normal | verbose
//! encode_dir_names = true    # Percent-encode a directory's own name in its URL
//!
//! [assets]
//! source = "assets"          # Optional directory of static files to stage
//! extensions = ["css", "js", "png", "jpg", "svg", "ico"]
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::output::Verbosity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "linkmirror.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run configuration.
///
/// All fields have defaults; a config file needs only the values it
/// overrides. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory to mirror. Its final component names the tree root.
    pub source: PathBuf,
    /// Destination root. Recreated from scratch on every build.
    pub destination: PathBuf,
    /// URL prefix under which the destination is served.
    pub web_root: String,
    /// File name of every generated index page.
    pub index_name: String,
    /// Display name shown in page titles.
    pub site_name: String,
    /// How much progress output to print.
    pub verbosity: Verbosity,
    /// Whether a directory's own name is percent-encoded in its web path.
    pub encode_dir_names: bool,
    /// Static asset staging.
    pub assets: AssetsConfig,
    /// Parallel walk settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("home"),
            destination: PathBuf::from("dist"),
            web_root: "/".to_string(),
            index_name: "index.html".to_string(),
            site_name: "Mirror".to_string(),
            verbosity: Verbosity::Normal,
            encode_dir_names: true,
            assets: AssetsConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.as_os_str().is_empty() {
            return Err(ConfigError::Validation("source must not be empty".into()));
        }
        if self.web_root.is_empty() {
            return Err(ConfigError::Validation("web_root must not be empty".into()));
        }
        if self.index_name.is_empty() || self.index_name.contains('/') {
            return Err(ConfigError::Validation(
                "index_name must be a plain file name".into(),
            ));
        }
        if let Some(bad) = self
            .assets
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(format!(
                "assets.extensions entries must be bare extensions, got {bad:?}"
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Static asset staging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory whose matching files are copied into the destination root.
    pub source: Option<PathBuf>,
    /// File extensions (without the dot) that are staged.
    pub extensions: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            source: None,
            extensions: ["css", "js", "png", "jpg", "svg", "ico"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// Parallel walk settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of walker threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer every override is merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. The file must exist.
pub fn read_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load a config file as a raw TOML value if it exists.
///
/// Returns `Ok(None)` if there is no file at `path`.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    read_config_file(path).map(Some)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the full layered config.
///
/// `file` is an explicit config path (must exist); without it the default
/// file is used when present. `cli` holds command-line overrides and wins
/// over everything else.
pub fn load_config(
    file: Option<&Path>,
    cli: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let file_layer = match file {
        Some(path) => Some(read_config_file(path)?),
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    let base = match file_layer {
        Some(layer) => merge_toml(stock_defaults_value()?, layer),
        None => stock_defaults_value()?,
    };
    resolve_config(base, cli)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# linkmirror configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# Directory to mirror. Its last path component becomes the top of the mirror,
# so "projects/home" is mirrored to <destination>/home.
source = "home"

# Destination root. It is deleted and recreated on every build.
destination = "dist"

# URL prefix the destination is served under ("/" or "http://host/path/").
web_root = "/"

# File name of the index page written into every mirrored directory.
# A source file with this name is treated as a stale index and skipped.
index_name = "index.html"

# Shown in page titles and the page header.
site_name = "Mirror"

# Progress output: "quiet" (failures + summary), "normal" (full tree),
# "verbose" (full tree + link targets).
verbosity = "normal"

# Percent-encode each directory's own name in its URL.
encode_dir_names = true

# ---------------------------------------------------------------------------
# Static assets
# ---------------------------------------------------------------------------
[assets]
# Directory whose matching files are copied into the destination root.
# source = "assets"

# Extensions (without the dot) that are copied.
extensions = ["css", "js", "png", "jpg", "svg", "ico"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel walker threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.source, PathBuf::from("home"));
        assert_eq!(config.destination, PathBuf::from("dist"));
        assert_eq!(config.web_root, "/");
        assert_eq!(config.index_name, "index.html");
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(config.encode_dir_names);
        assert!(config.assets.source.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
web_root = "http://x/"

[assets]
source = "static"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        // Overridden values
        assert_eq!(config.web_root, "http://x/");
        assert_eq!(config.assets.source, Some(PathBuf::from("static")));
        // Defaults preserved
        assert_eq!(config.index_name, "index.html");
        assert!(config.assets.extensions.contains(&"css".to_string()));
    }

    #[test]
    fn parse_verbosity() {
        let config: SiteConfig = toml::from_str(r#"verbosity = "verbose""#).unwrap();
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert!(toml::from_str::<SiteConfig>(r#"verbosity = "loud""#).is_err());
    }

    // =========================================================================
    // effective_threads tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(100_000),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"web_root = "/""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"web_root = "http://x/""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["web_root"].as_str(), Some("http://x/"));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[assets]
source = "a"
extensions = ["css"]
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[assets]
source = "b"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["assets"]["source"].as_str(), Some("b"));
        assert_eq!(merged["assets"]["extensions"][0].as_str(), Some("css"));
    }

    #[test]
    fn merge_toml_three_layers() {
        let stock = stock_defaults_value().unwrap();
        let file: toml::Value = toml::from_str(
            r#"
web_root = "http://file/"
site_name = "From file"
"#,
        )
        .unwrap();
        let cli: toml::Value = toml::from_str(r#"web_root = "http://cli/""#).unwrap();

        let config = resolve_config(merge_toml(stock, file), Some(cli)).unwrap();
        assert_eq!(config.web_root, "http://cli/");
        assert_eq!(config.site_name, "From file");
        assert_eq!(config.index_name, "index.html");
    }

    // =========================================================================
    // Unknown keys and validation
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(r#"web_rot = "/""#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
[assets]
sauce = "x"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_index_name_with_slash() {
        let mut config = SiteConfig::default();
        config.index_name = "a/index.html".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_index_name() {
        let mut config = SiteConfig::default();
        config.index_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_web_root() {
        let mut config = SiteConfig::default();
        config.web_root = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_dotted_extension() {
        let mut config = SiteConfig::default();
        config.assets.extensions = vec![".css".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_processes() {
        let mut config = SiteConfig::default();
        config.processing.max_processes = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str(r#"index_name = """#).unwrap();
        assert!(resolve_config(base, Some(overlay)).is_err());
    }

    // =========================================================================
    // File loading
    // =========================================================================

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_raw_config(&tmp.path().join("linkmirror.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn load_config_reads_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(
            &path,
            r#"
source = "/srv/files/home"
index_name = "dir.html"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.source, PathBuf::from("/srv/files/home"));
        assert_eq!(config.index_name, "dir.html");
        assert_eq!(config.web_root, "/");
    }

    #[test]
    fn load_config_missing_explicit_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("absent.toml")), None);
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_cli_overlay_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, r#"web_root = "http://file/""#).unwrap();
        let cli: toml::Value = toml::from_str(r#"web_root = "http://cli/""#).unwrap();

        let config = load_config(Some(&path), Some(cli)).unwrap();
        assert_eq!(config.web_root, "http://cli/");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, "this is = = not toml").unwrap();
        assert!(matches!(
            load_config(Some(&path), None),
            Err(ConfigError::Toml(_))
        ));
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.source, defaults.source);
        assert_eq!(config.destination, defaults.destination);
        assert_eq!(config.web_root, defaults.web_root);
        assert_eq!(config.index_name, defaults.index_name);
        assert_eq!(config.site_name, defaults.site_name);
        assert_eq!(config.verbosity, defaults.verbosity);
        assert_eq!(config.assets.extensions, defaults.assets.extensions);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_is_table() {
        let value = stock_defaults_value().unwrap();
        assert!(value.is_table());
        assert!(value.get("assets").is_some());
        assert!(value.get("processing").is_some());
    }
}
