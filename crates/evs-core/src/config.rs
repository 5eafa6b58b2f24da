//! Configuration types for evs.
//!
//! [`Config::load`] reads `~/.config/evs/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).
//! Command-line flags are applied on top by the binary.

use crate::error::ConfigError;
use crate::search::FilePattern;
use crate::types::{SearchCriterion, SearchLimit, SearchRequest, DEFAULT_LIMIT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[search]
directory = "."
limit     = 1000
pattern   = ""
decoder   = "evtx"
event_id  = 4624

[ui]
timestamp_format     = "%Y-%m-%d %H:%M:%S%.3f"
index_pane_width_pct = 30
theme                = "dark"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/evs/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Which record decoder reads the log files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DecoderKind {
    /// Native Windows event log files.
    #[serde(rename = "evtx")]
    Evtx,
    /// One JSON record per line, as written by `evtx_dump -o jsonl`.
    #[serde(rename = "jsonl")]
    JsonLines,
}

impl DecoderKind {
    /// File name pattern used when `search.pattern` is empty.
    pub fn default_pattern(self) -> &'static str {
        match self {
            DecoderKind::Evtx => "*.evtx",
            DecoderKind::JsonLines => "*.jsonl",
        }
    }
}

impl FromStr for DecoderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "evtx" => Ok(DecoderKind::Evtx),
            "jsonl" | "json" => Ok(DecoderKind::JsonLines),
            other => Err(ConfigError::UnknownDecoder(other.to_string())),
        }
    }
}

/// `[search]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Glob matched against file names. Empty means the decoder's default.
    #[serde(default)]
    pub pattern: String,
    #[serde(default = "default_decoder")]
    pub decoder: DecoderKind,
    /// Event ID pre-filled in the search form.
    #[serde(default = "default_event_id")]
    pub event_id: i64,
}

fn default_directory() -> PathBuf { PathBuf::from(".") }
fn default_limit() -> usize { DEFAULT_LIMIT }
fn default_decoder() -> DecoderKind { DecoderKind::Evtx }
fn default_event_id() -> i64 { 4624 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            limit: default_limit(),
            pattern: String::new(),
            decoder: default_decoder(),
            event_id: default_event_id(),
        }
    }
}

impl SearchConfig {
    pub fn limit(&self) -> Result<SearchLimit, ConfigError> {
        SearchLimit::new(self.limit).ok_or(ConfigError::ZeroLimit)
    }

    pub fn pattern(&self) -> &str {
        if self.pattern.trim().is_empty() {
            self.decoder.default_pattern()
        } else {
            self.pattern.trim()
        }
    }

    pub fn file_pattern(&self) -> Result<FilePattern, ConfigError> {
        FilePattern::new(self.pattern())
    }

    /// The target directory, made absolute against the working directory so
    /// the UI can show where it is looking.
    pub fn resolved_directory(&self) -> PathBuf {
        if self.directory.is_absolute() {
            return self.directory.clone();
        }
        match std::env::current_dir() {
            Ok(cwd) if self.directory == Path::new(".") => cwd,
            Ok(cwd) => cwd.join(&self.directory),
            Err(_) => self.directory.clone(),
        }
    }

    pub fn request(&self, criterion: SearchCriterion) -> Result<SearchRequest, ConfigError> {
        Ok(SearchRequest::new(self.resolved_directory(), criterion, self.limit()?))
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_index_pane_width_pct")]
    pub index_pane_width_pct: u16,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_timestamp_format() -> String { "%Y-%m-%d %H:%M:%S%.3f".to_string() }
fn default_index_pane_width_pct() -> u16 { 30 }
fn default_theme() -> String { "dark".to_string() }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            index_pane_width_pct: default_index_pane_width_pct(),
            theme: default_theme(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/evs/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load a specific file layered on top of the built-in defaults. A missing
    /// file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Reject values that would make every search meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.limit()?;
        self.search.file_pattern()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("evs")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
