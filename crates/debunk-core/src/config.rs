//! Configuration loading and typed config structures for the Debunk game.
//!
//! The canonical configuration lives in `debunk-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty (or missing) file is a valid
//! configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unplayable game.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `debunk-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Session-level settings (theme, sentinel, seed).
    #[serde(default)]
    pub game: SessionConfig,

    /// Post spawning and absorption timing.
    #[serde(default)]
    pub posts: PostConfig,

    /// Evaluation endpoint.
    #[serde(default)]
    pub evaluator: EvaluatorConfig,

    /// Post catalogue location.
    #[serde(default)]
    pub catalogue: CatalogueConfig,

    /// Observer server binding.
    #[serde(default)]
    pub server: ServerConfig,

    /// Scheduler tick loop.
    #[serde(default)]
    pub ticker: TickerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `EVALUATOR_URL` overrides `evaluator.url`
    /// - `OBSERVER_PORT` overrides `server.port`
    /// - `CATALOGUE_PATH` overrides `catalogue.path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply env overrides, and
    /// validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override endpoint and path settings with environment variables when
    /// set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("EVALUATOR_URL") {
            self.evaluator.url = val;
        }
        if let Ok(val) = std::env::var("CATALOGUE_PATH") {
            self.catalogue.path = val;
        }
        if let Some(port) = std::env::var("OBSERVER_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.server.port = port;
        }
    }

    /// Reject configurations the scheduler cannot run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let posts = &self.posts;
        if posts.spawn_interval_ms == 0 {
            return Err(invalid("posts.spawn_interval_ms must be at least 1"));
        }
        if posts.absorb_delay_ms == 0 {
            return Err(invalid("posts.absorb_delay_ms must be at least 1"));
        }
        if posts.enter_delay_ms >= posts.absorb_delay_ms {
            return Err(invalid(
                "posts.enter_delay_ms must be shorter than posts.absorb_delay_ms",
            ));
        }
        if posts.increase_min > posts.increase_max {
            return Err(invalid("posts.increase_min must not exceed posts.increase_max"));
        }
        if posts.vertical_slots.is_empty() {
            return Err(invalid("posts.vertical_slots must list at least one row"));
        }
        if posts.max_active_posts == 0 {
            return Err(invalid("posts.max_active_posts must be at least 1"));
        }
        if self.ticker.tick_interval_ms == 0 {
            return Err(invalid("ticker.tick_interval_ms must be at least 1"));
        }
        if self.game.theme.trim().is_empty() {
            return Err(invalid("game.theme must not be empty"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// Session-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Catalogue theme used for post selection and evaluation context.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Submission that bypasses evaluation and drops the level to zero.
    /// `None` disables the override.
    #[serde(default = "default_sentinel")]
    pub sentinel: Option<String>,

    /// Fixed RNG seed for reproducible sessions. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            sentinel: default_sentinel(),
            seed: None,
        }
    }
}

/// Post spawning and absorption configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostConfig {
    /// Milliseconds between spawns.
    #[serde(default = "default_spawn_interval_ms")]
    pub spawn_interval_ms: u64,

    /// Milliseconds from spawn to absorption.
    #[serde(default = "default_absorb_delay_ms")]
    pub absorb_delay_ms: u64,

    /// Milliseconds a fresh post spends in the `Entering` stage.
    #[serde(default = "default_enter_delay_ms")]
    pub enter_delay_ms: u64,

    /// Smallest level increase an absorption can cause.
    #[serde(default = "default_increase_min")]
    pub increase_min: u32,

    /// Largest level increase an absorption can cause.
    #[serde(default = "default_increase_max")]
    pub increase_max: u32,

    /// Display rows a post can be assigned to.
    #[serde(default = "default_vertical_slots")]
    pub vertical_slots: Vec<u32>,

    /// Upper bound on concurrently active posts. Spawns are skipped while
    /// the bound is reached.
    #[serde(default = "default_max_active_posts")]
    pub max_active_posts: usize,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: default_spawn_interval_ms(),
            absorb_delay_ms: default_absorb_delay_ms(),
            enter_delay_ms: default_enter_delay_ms(),
            increase_min: default_increase_min(),
            increase_max: default_increase_max(),
            vertical_slots: default_vertical_slots(),
            max_active_posts: default_max_active_posts(),
        }
    }
}

/// Evaluation endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvaluatorConfig {
    /// URL the `{theme, input}` request is POSTed to.
    #[serde(default = "default_evaluator_url")]
    pub url: String,

    /// Request deadline in milliseconds. A timeout counts as a failure.
    #[serde(default = "default_evaluator_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            url: default_evaluator_url(),
            timeout_ms: default_evaluator_timeout_ms(),
        }
    }
}

/// Post catalogue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogueConfig {
    /// Path to the catalogue JSON file.
    #[serde(default = "default_catalogue_path")]
    pub path: String,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            path: default_catalogue_path(),
        }
    }
}

/// Observer server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Scheduler tick loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TickerConfig {
    /// Milliseconds between scheduler advances. Bounds the lateness of a
    /// spawn or absorption.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_theme() -> String {
    "flat_earth".to_owned()
}

#[allow(clippy::unnecessary_wraps)]
fn default_sentinel() -> Option<String> {
    Some("9歳".to_owned())
}

const fn default_spawn_interval_ms() -> u64 {
    3_000
}

const fn default_absorb_delay_ms() -> u64 {
    4_000
}

const fn default_enter_delay_ms() -> u64 {
    100
}

const fn default_increase_min() -> u32 {
    1
}

const fn default_increase_max() -> u32 {
    3
}

fn default_vertical_slots() -> Vec<u32> {
    vec![100, 180, 260, 340, 420]
}

const fn default_max_active_posts() -> usize {
    12
}

fn default_evaluator_url() -> String {
    "http://localhost:8080".to_owned()
}

const fn default_evaluator_timeout_ms() -> u64 {
    15_000
}

fn default_catalogue_path() -> String {
    "data/posts.json".to_owned()
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3001
}

const fn default_tick_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}
