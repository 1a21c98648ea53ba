//! Configuration management for `perfboard`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`PERFBOARD_*`)
//! 3. Project config (`.perfboard/config.yaml`, or the `--config` path)
//! 4. User config (`~/.config/perfboard/config.yaml`)
//! 5. Defaults

use crate::compare::ChangeThresholds;
use crate::error::{PerfError, Result};
use crate::metadata::FetchOptions;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable prefix for overrides.
const ENV_PREFIX: &str = "PERFBOARD_";
/// Project config directory, relative to the working directory.
pub const PROJECT_DIR: &str = ".perfboard";

pub const KEY_REFERENCE_FILE: &str = "reference_file";
pub const KEY_RESULTS_DIR: &str = "results_dir";
pub const KEY_RESULTS_EXTENSION: &str = "results_extension";
pub const KEY_OUTPUT: &str = "output";
pub const KEY_REPO_URL: &str = "repo_url";
pub const KEY_REPO_PATH: &str = "repo_path";
pub const KEY_METADATA_FILE: &str = "metadata_file";
pub const KEY_FETCH_TIMEOUT_MS: &str = "fetch_timeout_ms";
pub const KEY_FETCH_WORKERS: &str = "fetch_workers";
pub const KEY_NEUTRAL_CHANGE_PCT: &str = "neutral_change_pct";
pub const KEY_SCORE_CHANGE_PCT: &str = "score_change_pct";
pub const KEY_SHORT_SHA_LEN: &str = "short_sha_len";

/// Every recognized key with its default, in display order.
///
/// `metadata_file` has no default and is absent unless set.
pub const KNOWN_KEYS: &[(&str, Option<&str>)] = &[
    (KEY_REFERENCE_FILE, Some("best_times.csv")),
    (KEY_RESULTS_DIR, Some("results")),
    (KEY_RESULTS_EXTENSION, Some("tsv")),
    (KEY_OUTPUT, Some("dataset.json")),
    (KEY_REPO_URL, Some("https://github.com/unknown/unknown")),
    (KEY_REPO_PATH, Some(".")),
    (KEY_METADATA_FILE, None),
    (KEY_FETCH_TIMEOUT_MS, Some("5000")),
    (KEY_FETCH_WORKERS, Some("4")),
    (KEY_NEUTRAL_CHANGE_PCT, Some("2.0")),
    (KEY_SCORE_CHANGE_PCT, Some("5.0")),
    (KEY_SHORT_SHA_LEN, Some("7")),
];

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    Default,
    User,
    Project,
    Env,
    Cli,
}

impl ConfigSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::User => "user",
            Self::Project => "project",
            Self::Env => "env",
            Self::Cli => "cli",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configuration layer: normalized key -> raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `PERFBOARD_*` pairs.
    #[must_use]
    pub fn from_env_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                if stripped == "CONFIG" {
                    continue;
                }
                layer.insert(stripped, value);
            }
        }
        layer
    }

    /// Insert a value under its normalized key.
    pub fn insert(&mut self, key: &str, value: String) {
        self.values.insert(normalize_key(key), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Explicit project config file; not a layer value itself.
    pub config_path: Option<PathBuf>,
    pub reference_file: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub repo_url: Option<String>,
    pub repo_path: Option<PathBuf>,
    pub metadata_file: Option<PathBuf>,
    pub fetch_timeout_ms: Option<u64>,
    pub fetch_workers: Option<usize>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.reference_file {
            layer.insert(KEY_REFERENCE_FILE, path.to_string_lossy().to_string());
        }
        if let Some(path) = &self.results_dir {
            layer.insert(KEY_RESULTS_DIR, path.to_string_lossy().to_string());
        }
        if let Some(path) = &self.output {
            layer.insert(KEY_OUTPUT, path.to_string_lossy().to_string());
        }
        if let Some(url) = &self.repo_url {
            layer.insert(KEY_REPO_URL, url.clone());
        }
        if let Some(path) = &self.repo_path {
            layer.insert(KEY_REPO_PATH, path.to_string_lossy().to_string());
        }
        if let Some(path) = &self.metadata_file {
            layer.insert(KEY_METADATA_FILE, path.to_string_lossy().to_string());
        }
        if let Some(ms) = self.fetch_timeout_ms {
            layer.insert(KEY_FETCH_TIMEOUT_MS, ms.to_string());
        }
        if let Some(workers) = self.fetch_workers {
            layer.insert(KEY_FETCH_WORKERS, workers.to_string());
        }

        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    for (key, default) in KNOWN_KEYS {
        if let Some(value) = default {
            layer.insert(key, (*value).to_string());
        }
    }
    layer
}

/// Path of the user config file, if `HOME` is set.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    let home = env::var_os("HOME")?;
    Some(
        Path::new(&home)
            .join(".config")
            .join("perfboard")
            .join("config.yaml"),
    )
}

/// Load user config (`~/.config/perfboard/config.yaml`).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    match user_config_path() {
        Some(path) => ConfigLayer::from_yaml(&path),
        None => Ok(ConfigLayer::default()),
    }
}

/// Load project config from `project_root/.perfboard/config.yaml`, or from
/// `explicit` when given.
///
/// # Errors
///
/// Returns `Config` if an explicit path does not exist, or an error if the
/// file cannot be read or parsed.
pub fn load_project_config(project_root: &Path, explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) if !path.is_file() => Err(PerfError::Config(format!(
            "config file not found: {}",
            path.display()
        ))),
        Some(path) => ConfigLayer::from_yaml(path),
        None => ConfigLayer::from_yaml(&project_root.join(PROJECT_DIR).join("config.yaml")),
    }
}

/// Merged configuration with per-key provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    entries: BTreeMap<String, (String, ConfigSource)>,
}

impl ResolvedConfig {
    /// Merge `(source, layer)` pairs given lowest precedence first.
    #[must_use]
    pub fn from_layers(layers: &[(ConfigSource, ConfigLayer)]) -> Self {
        let mut entries = BTreeMap::new();
        for (source, layer) in layers {
            for (key, value) in &layer.values {
                entries.insert(key.clone(), (value.clone(), *source));
            }
        }
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(|(v, _)| v.as_str())
    }

    #[must_use]
    pub fn source(&self, key: &str) -> Option<ConfigSource> {
        self.entries.get(&normalize_key(key)).map(|(_, s)| *s)
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, ConfigSource)> {
        self.entries
            .iter()
            .map(|(k, (v, s))| (k.as_str(), v.as_str(), *s))
    }

    /// Keys set somewhere that perfboard does not recognize.
    #[must_use]
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|key| !is_known_key(key))
            .map(String::as_str)
            .collect()
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| PerfError::Config(format!("missing value for '{key}'")))
    }

    fn parse_num<T: std::str::FromStr>(&self, key: &str) -> Result<T> {
        let raw = self.require(key)?;
        raw.trim().parse().map_err(|_| {
            PerfError::Config(format!(
                "invalid value for '{key}' (from {}): {raw}",
                self.source(key).unwrap_or(ConfigSource::Default)
            ))
        })
    }
}

/// Typed settings after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub reference_file: PathBuf,
    pub results_dir: PathBuf,
    /// Without a leading dot.
    pub results_extension: String,
    pub output: PathBuf,
    pub repo_url: String,
    pub repo_path: PathBuf,
    pub metadata_file: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub fetch_workers: usize,
    pub thresholds: ChangeThresholds,
    pub short_sha_len: usize,
}

impl Settings {
    /// Settings from defaults alone.
    ///
    /// # Errors
    ///
    /// Never in practice; the defaults are constants that validate.
    pub fn defaults() -> Result<Self> {
        Self::from_resolved(&ResolvedConfig::from_layers(&[(
            ConfigSource::Default,
            default_config_layer(),
        )]))
    }

    /// Validate and type a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` when a value does not parse or is out of range.
    pub fn from_resolved(config: &ResolvedConfig) -> Result<Self> {
        let fetch_timeout_ms: u64 = config.parse_num(KEY_FETCH_TIMEOUT_MS)?;
        if fetch_timeout_ms == 0 {
            return Err(PerfError::Config(format!(
                "'{KEY_FETCH_TIMEOUT_MS}' must be positive"
            )));
        }
        let fetch_workers: usize = config.parse_num(KEY_FETCH_WORKERS)?;
        if fetch_workers == 0 {
            return Err(PerfError::Config(format!(
                "'{KEY_FETCH_WORKERS}' must be at least 1"
            )));
        }
        let short_sha_len: usize = config.parse_num(KEY_SHORT_SHA_LEN)?;
        if short_sha_len == 0 {
            return Err(PerfError::Config(format!(
                "'{KEY_SHORT_SHA_LEN}' must be at least 1"
            )));
        }

        let thresholds = ChangeThresholds {
            neutral_change_pct: parse_pct(config, KEY_NEUTRAL_CHANGE_PCT)?,
            score_change_pct: parse_pct(config, KEY_SCORE_CHANGE_PCT)?,
        };

        let results_extension = config
            .require(KEY_RESULTS_EXTENSION)?
            .trim()
            .trim_start_matches('.')
            .to_string();
        if results_extension.is_empty() {
            return Err(PerfError::Config(format!(
                "'{KEY_RESULTS_EXTENSION}' cannot be empty"
            )));
        }

        Ok(Self {
            reference_file: PathBuf::from(config.require(KEY_REFERENCE_FILE)?),
            results_dir: PathBuf::from(config.require(KEY_RESULTS_DIR)?),
            results_extension,
            output: PathBuf::from(config.require(KEY_OUTPUT)?),
            repo_url: config.require(KEY_REPO_URL)?.trim().to_string(),
            repo_path: PathBuf::from(config.require(KEY_REPO_PATH)?),
            metadata_file: config
                .get(KEY_METADATA_FILE)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            fetch_workers,
            thresholds,
            short_sha_len,
        })
    }

    #[must_use]
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: self.fetch_timeout,
            workers: self.fetch_workers,
            repo_url: self.repo_url.clone(),
        }
    }
}

/// Loaded configuration: provenance for `config` plus typed settings.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub resolved: ResolvedConfig,
    pub settings: Settings,
}

/// Load configuration with the standard precedence order.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or parsed, or a value
/// fails validation.
pub fn load_config(
    project_root: &Path,
    explicit: Option<&Path>,
    cli: &CliOverrides,
) -> Result<LoadedConfig> {
    let layers = [
        (ConfigSource::Default, default_config_layer()),
        (ConfigSource::User, load_user_config()?),
        (ConfigSource::Project, load_project_config(project_root, explicit)?),
        (ConfigSource::Env, ConfigLayer::from_env()),
        (ConfigSource::Cli, cli.as_layer()),
    ];
    resolve_layers(&layers)
}

/// Load configuration rooted at the working directory.
///
/// # Errors
///
/// Same as [`load_config`], plus an I/O error if the working directory is
/// unavailable.
pub fn load_from_cwd(cli: &CliOverrides) -> Result<LoadedConfig> {
    let cwd = env::current_dir()?;
    load_config(&cwd, cli.config_path.as_deref(), cli)
}

/// Resolve already-loaded layers.
///
/// # Errors
///
/// Returns `Config` if a value fails validation.
pub fn resolve_layers(layers: &[(ConfigSource, ConfigLayer)]) -> Result<LoadedConfig> {
    let resolved = ResolvedConfig::from_layers(layers);
    for key in resolved.unknown_keys() {
        warn!(
            key,
            source = %resolved.source(key).unwrap_or(ConfigSource::Default),
            "Ignoring unknown config key"
        );
    }
    let settings = Settings::from_resolved(&resolved)?;
    Ok(LoadedConfig { resolved, settings })
}

#[must_use]
pub fn is_known_key(key: &str) -> bool {
    let normalized = normalize_key(key);
    KNOWN_KEYS.iter().any(|(known, _)| *known == normalized)
}

fn parse_pct(config: &ResolvedConfig, key: &str) -> Result<f64> {
    let value: f64 = config.parse_num(key)?;
    if !value.is_finite() || value < 0.0 {
        return Err(PerfError::Config(format!(
            "'{key}' must be a non-negative number, got {value}"
        )));
    }
    Ok(value)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['-', '.'], "_")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Tagged(tagged) => flatten_yaml(&tagged.value, prefix, out),
        other => {
            if prefix.is_empty() {
                return;
            }
            if let Some(scalar) = yaml_scalar_to_string(other) {
                out.insert(prefix.to_string(), scalar);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
