//! Configuration loading and validation.
//!
//! Huddle reads a single `huddle.toml`. Every section and field has a serde
//! default, so an empty file (or no file at all) yields a working detector.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::scheduling::patterns::{AVAILABILITY_KEYWORDS, TRIGGER_KEYWORDS};

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "huddle.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Detection tuning and vocabularies.
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Result cache behaviour.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Detection tuning. Passed explicitly into the coordinator.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// Phrases that mark a message as a scheduling trigger.
    #[serde(default = "default_trigger_keywords")]
    pub trigger_keywords: Vec<String>,

    /// Phrases that mark a nearby message as an availability statement.
    #[serde(default = "default_availability_keywords")]
    pub availability_keywords: Vec<String>,

    /// Messages on either side of a trigger that cannot open a new thread.
    #[serde(default = "default_suppression_radius")]
    pub suppression_radius: usize,

    /// Messages on either side of a trigger scanned for availability.
    #[serde(default = "default_neighborhood_radius")]
    pub neighborhood_radius: usize,

    /// Meeting length used to compute slot end times.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,

    /// Confidence for a single keyword hit.
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,

    /// Confidence added per extra keyword hit.
    #[serde(default = "default_confidence_step")]
    pub confidence_step: f64,

    /// Upper bound on confidence.
    #[serde(default = "default_confidence_cap")]
    pub confidence_cap: f64,

    /// Maximum topic length in characters.
    #[serde(default = "default_topic_max_chars")]
    pub topic_max_chars: usize,

    /// Messages fetched per conversation when no limit is given.
    #[serde(default = "default_message_limit")]
    pub default_message_limit: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            trigger_keywords: default_trigger_keywords(),
            availability_keywords: default_availability_keywords(),
            suppression_radius: default_suppression_radius(),
            neighborhood_radius: default_neighborhood_radius(),
            default_duration_minutes: default_duration_minutes(),
            confidence_floor: default_confidence_floor(),
            confidence_step: default_confidence_step(),
            confidence_cap: default_confidence_cap(),
            topic_max_chars: default_topic_max_chars(),
            default_message_limit: default_message_limit(),
        }
    }
}

impl DetectorConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.trigger_keywords.iter().all(|k| k.trim().is_empty()) {
            anyhow::bail!("detector.trigger_keywords must contain at least one phrase");
        }
        if self.default_duration_minutes == 0 {
            anyhow::bail!("detector.default_duration_minutes must be positive");
        }
        if self.default_duration_minutes > 1440 {
            anyhow::bail!("detector.default_duration_minutes must not exceed one day");
        }
        for (name, value) in [
            ("confidence_floor", self.confidence_floor),
            ("confidence_step", self.confidence_step),
            ("confidence_cap", self.confidence_cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("detector.{name} must be within [0, 1], got {value}");
            }
        }
        if self.confidence_floor > self.confidence_cap {
            anyhow::bail!(
                "detector.confidence_floor ({}) exceeds confidence_cap ({})",
                self.confidence_floor,
                self.confidence_cap
            );
        }
        if self.topic_max_chars == 0 {
            anyhow::bail!("detector.topic_max_chars must be positive");
        }
        if self.default_message_limit == 0 {
            anyhow::bail!("detector.default_message_limit must be positive");
        }
        Ok(())
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Whether results are cached at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds a cached result stays valid.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Upper bound on cached reports; least useful entries are evicted first.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotated JSON logs. Console-only when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

// Default value functions for serde

fn default_trigger_keywords() -> Vec<String> {
    TRIGGER_KEYWORDS.iter().map(|k| (*k).to_owned()).collect()
}
fn default_availability_keywords() -> Vec<String> {
    AVAILABILITY_KEYWORDS.iter().map(|k| (*k).to_owned()).collect()
}
fn default_suppression_radius() -> usize {
    2
}
fn default_neighborhood_radius() -> usize {
    3
}
fn default_duration_minutes() -> u32 {
    30
}
fn default_confidence_floor() -> f64 {
    0.5
}
fn default_confidence_step() -> f64 {
    0.15
}
fn default_confidence_cap() -> f64 {
    0.95
}
fn default_topic_max_chars() -> usize {
    50
}
fn default_message_limit() -> usize {
    50
}
fn default_true() -> bool {
    true
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_cache_max_entries() -> u64 {
    1024
}
fn default_log_level() -> String {
    "info".to_owned()
}

/// Load and validate a config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config at {}", path.display()))
}

/// Parse and validate config text.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or a value is out of range.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents).context("failed to parse config TOML")?;
    config.detector.validate()?;
    Ok(config)
}

/// Load an explicit config path, or fall back to `~/.huddle/huddle.toml`,
/// or to built-in defaults when neither exists.
///
/// # Errors
///
/// Returns an error if an existing file cannot be loaded.
pub fn load_config_or_default(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return load_config(path);
    }
    let default_path = config_dir()?.join(CONFIG_FILE_NAME);
    if default_path.exists() {
        load_config(&default_path)
    } else {
        Ok(Config::default())
    }
}

/// Resolve the default config directory (`~/.huddle/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".huddle"))
}
