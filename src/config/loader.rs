//! Configuration file loading with precedence handling.

use crate::state::{ReorderMode, TableFeatures, DEFAULT_OVERSCAN, DEFAULT_PAGE_SIZE};
use crate::view_state::{RowHeight, ToolbarFlags};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "ROSTERGRID_CONFIG";

/// Environment variable overriding the page size.
pub const PAGE_SIZE_ENV: &str = "ROSTERGRID_PAGE_SIZE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/rostergrid/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Rows per page.
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Rows rendered beyond each edge of the viewport.
    #[serde(default)]
    pub overscan: Option<usize>,

    /// Quiet period before typed search text commits, in milliseconds.
    #[serde(default)]
    pub search_debounce_ms: Option<u64>,

    /// Render only the visible window of rows.
    #[serde(default)]
    pub virtualized: Option<bool>,

    /// Paginate rows.
    #[serde(default)]
    pub paginated: Option<bool>,

    /// Show the selection checkbox column.
    #[serde(default)]
    pub selectable: Option<bool>,

    /// Show the expansion toggle column.
    #[serde(default)]
    pub expandable: Option<bool>,

    /// Allow inline cell editing.
    #[serde(default)]
    pub editable: Option<bool>,

    /// `"live"` or `"on_drop"`.
    #[serde(default)]
    pub reorder_mode: Option<ReorderMode>,

    /// Show the search box.
    #[serde(default)]
    pub show_search: Option<bool>,

    /// Show the status filter.
    #[serde(default)]
    pub show_status_filter: Option<bool>,

    /// Show the column visibility menu.
    #[serde(default)]
    pub show_column_settings: Option<bool>,

    /// Show the export controls.
    #[serde(default)]
    pub show_export: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Rows per page.
    pub page_size: usize,
    /// Overscan rows.
    pub overscan: usize,
    /// Search debounce.
    pub search_debounce_ms: u64,
    /// Virtualization.
    pub virtualized: bool,
    /// Pagination.
    pub paginated: bool,
    /// Selection column.
    pub selectable: bool,
    /// Expansion column.
    pub expandable: bool,
    /// Inline editing.
    pub editable: bool,
    /// Reorder commit mode.
    pub reorder_mode: ReorderMode,
    /// Toolbar controls.
    pub toolbar: ToolbarFlags,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            overscan: DEFAULT_OVERSCAN,
            search_debounce_ms: 300,
            virtualized: true,
            paginated: true,
            selectable: true,
            expandable: true,
            editable: true,
            reorder_mode: ReorderMode::Live,
            toolbar: ToolbarFlags::default(),
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Table feature flags described by this config.
    pub fn features(&self) -> TableFeatures {
        TableFeatures {
            selectable: self.selectable,
            expandable: self.expandable,
            editable: self.editable,
            paginated: self.paginated,
            virtualized: self.virtualized,
            toolbar: self.toolbar,
            reorder_mode: self.reorder_mode,
            page_size: self.page_size,
            overscan: self.overscan,
            row_height: RowHeight::ONE,
            search_debounce: Duration::from_millis(self.search_debounce_ms),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/rostergrid/rostergrid.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("rostergrid").join("rostergrid.log")
    } else {
        PathBuf::from("rostergrid.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/rostergrid/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rostergrid").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `ROSTERGRID_CONFIG` environment variable
/// 3. Default path `~/.config/rostergrid/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(config_path: Option<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `ROSTERGRID_PAGE_SIZE`: override page size (ignored unless a positive integer)
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(page_size) = std::env::var(PAGE_SIZE_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
    {
        config.page_size = page_size;
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
/// A zero page size falls back to the default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let toolbar = ToolbarFlags {
        show_search: config.show_search.unwrap_or(defaults.toolbar.show_search),
        show_status_filter: config
            .show_status_filter
            .unwrap_or(defaults.toolbar.show_status_filter),
        show_column_settings: config
            .show_column_settings
            .unwrap_or(defaults.toolbar.show_column_settings),
        show_export: config.show_export.unwrap_or(defaults.toolbar.show_export),
    };

    ResolvedConfig {
        page_size: config
            .page_size
            .filter(|&n| n > 0)
            .unwrap_or(defaults.page_size),
        overscan: config.overscan.unwrap_or(defaults.overscan),
        search_debounce_ms: config
            .search_debounce_ms
            .unwrap_or(defaults.search_debounce_ms),
        virtualized: config.virtualized.unwrap_or(defaults.virtualized),
        paginated: config.paginated.unwrap_or(defaults.paginated),
        selectable: config.selectable.unwrap_or(defaults.selectable),
        expandable: config.expandable.unwrap_or(defaults.expandable),
        editable: config.editable.unwrap_or(defaults.editable),
        reorder_mode: config.reorder_mode.unwrap_or(defaults.reorder_mode),
        toolbar,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, page_size_override: Option<usize>) -> ResolvedConfig {
    if let Some(page_size) = page_size_override.filter(|&n| n > 0) {
        config.page_size = page_size;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
