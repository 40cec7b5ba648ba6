//! Configuration types for vizstream.
//!
//! [`Config::load`] reads `~/.config/vizstream/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_from`] reads an
//! explicit file. Both layer `VIZSTREAM__SECTION__KEY` environment variables
//! on top. [`Config::defaults`] returns the built-in defaults without touching
//! the filesystem or environment (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[backend]
base_url           = "http://127.0.0.1:8000"
connect_timeout_ms = 10000

[stream]
content_event = "content"

[table]
delimiter          = ","
schema_sample_rows = 100
"#;

const ENV_PREFIX: &str = "VIZSTREAM";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/vizstream/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub table: TableConfig,
}

/// `[backend]` section: where the generative backend lives.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_base_url() -> String { "http://127.0.0.1:8000".to_string() }
fn default_connect_timeout_ms() -> u64 { 10_000 }

impl BackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// `[stream]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Event category whose payloads carry the model's answer.
    #[serde(default = "default_content_event")]
    pub content_event: String,
}

fn default_content_event() -> String { crate::accumulator::CONTENT_EVENT.to_string() }

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            content_event: default_content_event(),
        }
    }
}

/// `[table]` section: delimited-text ingest.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_schema_sample_rows")]
    pub schema_sample_rows: usize,
}

fn default_delimiter() -> String { ",".to_string() }
fn default_schema_sample_rows() -> usize { 100 }

impl TableConfig {
    /// The delimiter as a single byte. Falls back to `,` when the configured
    /// value is empty or not a single ASCII character.
    pub fn delimiter_byte(&self) -> u8 {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => *b,
            _ => {
                tracing::warn!(delimiter = %self.delimiter, "invalid delimiter, using ','");
                b','
            }
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            schema_sample_rows: default_schema_sample_rows(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/vizstream/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load an explicit file, layered on top of the built-in defaults. The
    /// file must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(true))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
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
        .join("vizstream")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
