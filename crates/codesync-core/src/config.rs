//! Configuration module for codesync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default name of the settings file holding `ignoredPaths`.
pub const DEFAULT_IGNORE_FILE: &str = ".cw-settings";

/// Default name of the reference-path file holding `refPaths`.
pub const DEFAULT_REF_PATHS_FILE: &str = ".cw-refpaths.json";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for codesync.
///
/// Every section is optional in the YAML file; missing sections take their
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Remote store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the remote store, e.g. `http://localhost:9090`.
    pub url: String,
    /// Bearer token sent with every request. `None` for unauthenticated remotes.
    pub access_token: Option<String>,
}

/// Sync pass settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Name of the ignore-rule file at the project root.
    pub ignore_file: String,
    /// Name of the reference-path file at the project root.
    pub ref_paths_file: String,
    /// Maximum number of file uploads in flight at once.
    pub upload_concurrency: u32,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/codesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("codesync")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9090".to_string(),
            access_token: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            ref_paths_file: DEFAULT_REF_PATHS_FILE.to_string(),
            upload_concurrency: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.upload_concurrency"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `sync.upload_concurrency`.
const MAX_UPLOAD_CONCURRENCY: u32 = 64;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- remote ---
        if !(self.remote.url.starts_with("http://") || self.remote.url.starts_with("https://")) {
            errors.push(ValidationError {
                field: "remote.url".into(),
                message: format!("must be an http(s) URL, got '{}'", self.remote.url),
            });
        }
        if matches!(self.remote.access_token.as_deref(), Some(t) if t.trim().is_empty()) {
            errors.push(ValidationError {
                field: "remote.access_token".into(),
                message: "must not be blank when set".into(),
            });
        }

        // --- sync ---
        for (field, name) in [
            ("sync.ignore_file", &self.sync.ignore_file),
            ("sync.ref_paths_file", &self.sync.ref_paths_file),
        ] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                errors.push(ValidationError {
                    field: field.into(),
                    message: format!("must be a plain file name, got '{name}'"),
                });
            }
        }
        if self.sync.ignore_file == self.sync.ref_paths_file {
            errors.push(ValidationError {
                field: "sync.ref_paths_file".into(),
                message: "must differ from sync.ignore_file".into(),
            });
        }
        if self.sync.upload_concurrency == 0 || self.sync.upload_concurrency > MAX_UPLOAD_CONCURRENCY
        {
            errors.push(ValidationError {
                field: "sync.upload_concurrency".into(),
                message: format!("must be between 1 and {MAX_UPLOAD_CONCURRENCY}"),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use codesync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .remote_url("https://codewind.example.com")
///     .sync_upload_concurrency(4)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- remote ---

    pub fn remote_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote.url = url.into();
        self
    }

    pub fn remote_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.remote.access_token = Some(token.into());
        self
    }

    // --- sync ---

    pub fn sync_ignore_file(mut self, name: impl Into<String>) -> Self {
        self.config.sync.ignore_file = name.into();
        self
    }

    pub fn sync_ref_paths_file(mut self, name: impl Into<String>) -> Self {
        self.config.sync.ref_paths_file = name.into();
        self
    }

    pub fn sync_upload_concurrency(mut self, n: u32) -> Self {
        self.config.sync.upload_concurrency = n;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert_eq!(cfg.remote.url, "http://localhost:9090");
        assert!(cfg.remote.access_token.is_none());
        assert_eq!(cfg.sync.ignore_file, ".cw-settings");
        assert_eq!(cfg.sync.ref_paths_file, ".cw-refpaths.json");
        assert_eq!(cfg.sync.upload_concurrency, 1);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_passes_validation() {
        let errors = Config::default().validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
remote:
  url: https://codewind.example.com
  access_token: "secret-token"
sync:
  ignore_file: .settings.json
  ref_paths_file: .refs.json
  upload_concurrency: 8
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.remote.url, "https://codewind.example.com");
        assert_eq!(cfg.remote.access_token, Some("secret-token".to_string()));
        assert_eq!(cfg.sync.ignore_file, ".settings.json");
        assert_eq!(cfg.sync.ref_paths_file, ".refs.json");
        assert_eq!(cfg.sync.upload_concurrency, 8);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_partial_yaml_fills_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"sync:\n  upload_concurrency: 3\n").unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.sync.upload_concurrency, 3);
        assert_eq!(cfg.sync.ignore_file, DEFAULT_IGNORE_FILE);
        assert_eq!(cfg.remote.url, "http://localhost:9090");
    }

    #[test]
    fn load_or_default_returns_default_on_missing_file() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(cfg.sync.upload_concurrency, 1);
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"not: [valid: yaml: {{{").unwrap();
        tmp.flush().unwrap();

        assert!(Config::load(tmp.path()).is_err());
    }

    // -- Validation --

    #[test]
    fn validate_catches_bad_url() {
        let mut cfg = Config::default();
        cfg.remote.url = "localhost:9090".into();
        assert!(cfg.validate().iter().any(|e| e.field == "remote.url"));
    }

    #[test]
    fn validate_catches_blank_token() {
        let mut cfg = Config::default();
        cfg.remote.access_token = Some("  ".into());
        assert!(cfg.validate().iter().any(|e| e.field == "remote.access_token"));
    }

    #[test]
    fn validate_catches_nested_control_file_name() {
        let mut cfg = Config::default();
        cfg.sync.ignore_file = "conf/.cw-settings".into();
        assert!(cfg.validate().iter().any(|e| e.field == "sync.ignore_file"));
    }

    #[test]
    fn validate_catches_identical_control_files() {
        let mut cfg = Config::default();
        cfg.sync.ref_paths_file = cfg.sync.ignore_file.clone();
        assert!(cfg.validate().iter().any(|e| e.field == "sync.ref_paths_file"));
    }

    #[test]
    fn validate_catches_concurrency_out_of_range() {
        let mut cfg = Config::default();
        cfg.sync.upload_concurrency = 0;
        assert!(cfg
            .validate()
            .iter()
            .any(|e| e.field == "sync.upload_concurrency"));

        cfg.sync.upload_concurrency = 65;
        assert!(cfg
            .validate()
            .iter()
            .any(|e| e.field == "sync.upload_concurrency"));
    }

    #[test]
    fn validate_catches_invalid_log_level() {
        let mut cfg = Config::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().iter().any(|e| e.field == "logging.level"));
    }

    #[test]
    fn validate_accepts_all_valid_log_levels() {
        for level in VALID_LOG_LEVELS {
            let mut cfg = Config::default();
            cfg.logging.level = level.to_string();
            assert!(
                !cfg.validate().iter().any(|e| e.field == "logging.level"),
                "level '{level}' should be valid"
            );
        }
    }

    // -- Builder --

    #[test]
    fn builder_starts_from_defaults() {
        let cfg = ConfigBuilder::new().build();
        assert_eq!(cfg.sync.upload_concurrency, 1);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = ConfigBuilder::new()
            .remote_url("https://remote.example.com")
            .remote_access_token("tok")
            .sync_ignore_file(".ignore.json")
            .sync_ref_paths_file(".refs.json")
            .sync_upload_concurrency(4)
            .logging_level("warn")
            .build();

        assert_eq!(cfg.remote.url, "https://remote.example.com");
        assert_eq!(cfg.remote.access_token.as_deref(), Some("tok"));
        assert_eq!(cfg.sync.ignore_file, ".ignore.json");
        assert_eq!(cfg.sync.ref_paths_file, ".refs.json");
        assert_eq!(cfg.sync.upload_concurrency, 4);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn builder_build_validated_fails_for_invalid_config() {
        let result = ConfigBuilder::new().sync_upload_concurrency(0).build_validated();
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "sync.upload_concurrency: must be between 1 and 64");
    }

    #[test]
    fn builder_build_validated_succeeds_for_valid_config() {
        assert!(ConfigBuilder::new().logging_level("trace").build_validated().is_ok());
    }
}
