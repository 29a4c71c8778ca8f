//! Configuration management for cas-extract using the prefer crate.
//!
//! A config file (TOML, YAML or JSON) names the corpus roots, the annotators
//! whose exports are kept, the expected file counts and the output paths.
//! Relative paths resolve against the config file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::services::corpus::{CorpusConfig, DEFAULT_WORKERS};

/// Name used for config file discovery (`cas-extract.toml`, ...).
pub const CONFIG_NAME: &str = "cas-extract";

/// Default table output file.
pub const DEFAULT_OUTPUT: &str = "data.csv";

/// Default word-exploded output file.
pub const DEFAULT_EXPLODED_OUTPUT: &str = "data_exploded.csv";

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the per-annotator exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_dir: Option<String>,
    /// Root of the curated exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curation_dir: Option<String>,
    /// Annotator ids whose annotation exports are kept.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotators: Vec<String>,
    /// File name suffixes to skip (defaults to INITIAL_CAS.json).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_suffixes: Option<Vec<String>>,
    /// Number of annotation files the filter must select.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_annotation_files: Option<usize>,
    /// Number of curation files that must be present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_curation_files: Option<usize>,
    /// Table output path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Word-exploded table output path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploded_output: Option<String>,
    /// Concurrent extraction workers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no config file is found.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Format is chosen from the extension; anything else is read as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
}

/// Application settings resolved from the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub annotation_dir: PathBuf,
    pub curation_dir: PathBuf,
    pub annotators: Vec<String>,
    pub exclude_suffixes: Vec<String>,
    pub expected_annotation_files: Option<usize>,
    pub expected_curation_files: Option<usize>,
    pub output: PathBuf,
    pub exploded_output: PathBuf,
    pub workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let corpus = CorpusConfig::default();
        Self {
            annotation_dir: corpus.annotation_dir,
            curation_dir: corpus.curation_dir,
            annotators: corpus.annotators,
            exclude_suffixes: corpus.exclude_suffixes,
            expected_annotation_files: None,
            expected_curation_files: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            exploded_output: PathBuf::from(DEFAULT_EXPLODED_OUTPUT),
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Settings {
    /// Apply a config file on top of the defaults.
    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        let resolve = |p: &str| {
            let path = PathBuf::from(p);
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        let defaults = Self::default();
        Self {
            annotation_dir: config
                .annotation_dir
                .as_deref()
                .map(resolve)
                .unwrap_or_else(|| base_dir.join(&defaults.annotation_dir)),
            curation_dir: config
                .curation_dir
                .as_deref()
                .map(resolve)
                .unwrap_or_else(|| base_dir.join(&defaults.curation_dir)),
            annotators: config.annotators.clone(),
            exclude_suffixes: config
                .exclude_suffixes
                .clone()
                .unwrap_or(defaults.exclude_suffixes),
            expected_annotation_files: config.expected_annotation_files,
            expected_curation_files: config.expected_curation_files,
            output: config
                .output
                .as_deref()
                .map(resolve)
                .unwrap_or_else(|| base_dir.join(&defaults.output)),
            exploded_output: config
                .exploded_output
                .as_deref()
                .map(resolve)
                .unwrap_or_else(|| base_dir.join(&defaults.exploded_output)),
            workers: config.workers.unwrap_or(defaults.workers).max(1),
        }
    }

    /// Corpus builder configuration for these settings.
    pub fn corpus_config(&self) -> CorpusConfig {
        CorpusConfig {
            annotation_dir: self.annotation_dir.clone(),
            curation_dir: self.curation_dir.clone(),
            annotators: self.annotators.clone(),
            exclude_suffixes: self.exclude_suffixes.clone(),
            expected_annotation_files: self.expected_annotation_files,
            expected_curation_files: self.expected_curation_files,
            workers: self.workers,
        }
    }
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return match Config::load_from_path(config_path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{} ({}), using defaults", e, config_path.display());
                Config::default()
            }
        };
    }

    // Priority 2: Auto-discover via prefer
    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = load_file_config(&options).await;

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd
    } else {
        config.base_dir().unwrap_or(cwd)
    };
    tracing::debug!("Resolving relative paths from {}", base_dir.display());

    (Settings::from_config(&config, &base_dir), config)
}
