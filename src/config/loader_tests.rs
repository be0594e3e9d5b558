//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_returns_some_path() {
    let path = default_config_path();
    assert!(
        path.is_some(),
        "default_config_path should return Some on supported platforms"
    );
}

#[test]
fn default_config_path_contains_rostergrid_config_toml() {
    let path = default_config_path().expect("Should have default path");
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("rostergrid") && path_str.ends_with("config.toml"),
        "Path should contain 'rostergrid' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn default_log_path_ends_with_rostergrid_log() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("rostergrid.log"),
        "Default log path should end with 'rostergrid.log', got: {:?}",
        path
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = env::temp_dir().join("rostergrid_test_config.toml");

    let toml_content = r#"
page_size = 50
overscan = 8
search_debounce_ms = 150
virtualized = false
reorder_mode = "on_drop"
show_export = false
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.page_size, Some(50));
    assert_eq!(config.overscan, Some(8));
    assert_eq!(config.search_debounce_ms, Some(150));
    assert_eq!(config.virtualized, Some(false));
    assert_eq!(config.reorder_mode, Some(ReorderMode::OnDrop));
    assert_eq!(config.show_export, Some(false));
    assert_eq!(config.editable, None);

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = env::temp_dir().join("rostergrid_test_invalid.toml");
    fs::write(&config_path, "page_size = [unclosed").expect("Failed to write test config");

    let result = load_config_file(&config_path);

    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Invalid TOML should be a parse error, got {:?}",
        result
    );
    fs::remove_file(config_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("row_colour = \"blue\"");
    assert!(result.is_err(), "Unknown keys should be rejected");
}

#[test]
fn config_file_rejects_unknown_reorder_mode() {
    let result: Result<ConfigFile, _> = toml::from_str("reorder_mode = \"sometimes\"");
    assert!(result.is_err());
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_overrides_with_config_file_values() {
    let config_file = ConfigFile {
        page_size: Some(10),
        paginated: Some(false),
        show_search: Some(false),
        log_file_path: Some(PathBuf::from("/custom/path/to/app.log")),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));

    assert_eq!(resolved.page_size, 10);
    assert!(!resolved.paginated);
    assert!(!resolved.toolbar.show_search);
    assert!(resolved.toolbar.show_export, "unset flags keep defaults");
    assert_eq!(resolved.log_file_path, PathBuf::from("/custom/path/to/app.log"));
}

#[test]
fn merge_config_ignores_zero_page_size() {
    let config_file = ConfigFile {
        page_size: Some(0),
        ..ConfigFile::default()
    };
    assert_eq!(merge_config(Some(config_file)).page_size, DEFAULT_PAGE_SIZE);
}

#[test]
fn resolved_config_default_has_expected_values() {
    let config = ResolvedConfig::default();

    assert_eq!(config.page_size, 25);
    assert_eq!(config.overscan, 3);
    assert_eq!(config.search_debounce_ms, 300);
    assert!(config.virtualized && config.paginated);
    assert!(config.selectable && config.expandable && config.editable);
    assert_eq!(config.reorder_mode, ReorderMode::Live);
}

#[test]
fn features_carry_resolved_values() {
    let config = ResolvedConfig {
        page_size: 7,
        search_debounce_ms: 40,
        editable: false,
        ..ResolvedConfig::default()
    };

    let features = config.features();

    assert_eq!(features.page_size, 7);
    assert_eq!(features.search_debounce, Duration::from_millis(40));
    assert!(!features.editable);
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(rostergrid_page_size)]
fn apply_env_overrides_respects_page_size() {
    let _guard = EnvGuard::new(PAGE_SIZE_ENV);
    env::set_var(PAGE_SIZE_ENV, "40");

    let result = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(result.page_size, 40);
}

#[test]
#[serial(rostergrid_page_size)]
fn apply_env_overrides_ignores_invalid_page_size() {
    let _guard = EnvGuard::new(PAGE_SIZE_ENV);
    let base = ResolvedConfig::default();

    for raw in ["0", "-3", "lots"] {
        env::set_var(PAGE_SIZE_ENV, raw);
        assert_eq!(apply_env_overrides(base.clone()), base, "{raw:?} should be ignored");
    }
}

#[test]
#[serial(rostergrid_page_size)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _guard = EnvGuard::new(PAGE_SIZE_ENV);
    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(rostergrid_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    let temp_dir = env::temp_dir();
    let explicit_path = temp_dir.join("rostergrid_explicit.toml");
    fs::write(&explicit_path, "page_size = 11").expect("Failed to write explicit config");
    let env_path = temp_dir.join("rostergrid_env.toml");
    fs::write(&env_path, "page_size = 22").expect("Failed to write env config");
    env::set_var(CONFIG_ENV, &env_path);

    let config = load_config_with_precedence(Some(explicit_path.clone()))
        .expect("valid config")
        .expect("config present");

    assert_eq!(
        config.page_size,
        Some(11),
        "Should use explicit path, not ROSTERGRID_CONFIG"
    );
    fs::remove_file(explicit_path).ok();
    fs::remove_file(env_path).ok();
}

#[test]
#[serial(rostergrid_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV);
    let env_path = env::temp_dir().join("rostergrid_env_only.toml");
    fs::write(&env_path, "page_size = 33").expect("Failed to write env config");
    env::set_var(CONFIG_ENV, &env_path);

    let config = load_config_with_precedence(None)
        .expect("valid config")
        .expect("config present");

    assert_eq!(config.page_size, Some(33));
    fs::remove_file(env_path).ok();
}

#[test]
fn apply_cli_overrides_page_size() {
    let result = apply_cli_overrides(ResolvedConfig::default(), Some(5));
    assert_eq!(result.page_size, 5);
}

#[test]
fn apply_cli_overrides_no_overrides() {
    let base = ResolvedConfig::default();
    assert_eq!(apply_cli_overrides(base.clone(), None), base);
}

#[test]
#[serial(rostergrid_page_size)]
fn precedence_chain_file_then_env_then_cli() {
    let _guard = EnvGuard::new(PAGE_SIZE_ENV);
    let file = ConfigFile {
        page_size: Some(10),
        overscan: Some(1),
        ..ConfigFile::default()
    };

    let merged = merge_config(Some(file));
    assert_eq!(merged.page_size, 10);

    env::set_var(PAGE_SIZE_ENV, "20");
    let with_env = apply_env_overrides(merged);
    assert_eq!(with_env.page_size, 20);

    let with_cli = apply_cli_overrides(with_env, Some(30));
    assert_eq!(with_cli.page_size, 30);
    assert_eq!(with_cli.overscan, 1, "untouched fields keep the file value");
}
