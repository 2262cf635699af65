//! Client configuration.
//!
//! # Hierarchy
//!
//! Configuration is assembled in this order (later overrides earlier):
//! 1. Built-in defaults (`deferred-job:` prefix, quiet)
//! 2. A TOML file or string
//! 3. Environment variables: `DEFERRED_KEY_PREFIX`, `DEFERRED_VERBOSE`
//! 4. Builder calls (`key_mapper`, `verbose`)
//!
//! # Example Config
//!
//! ```toml
//! key_prefix = "deferred-job:"
//! verbose = true
//! ```
//!
//! An arbitrary id → key function cannot be expressed in a file; set it
//! with [`Config::with_key_mapper`] or the builder.

use std::path::Path;

use deferred_core::KeyMapper;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable overriding the pending-set key prefix
pub const ENV_KEY_PREFIX: &str = "DEFERRED_KEY_PREFIX";

/// Environment variable toggling per-token tracing
pub const ENV_VERBOSE: &str = "DEFERRED_VERBOSE";

/// Settings shared by every barrier of a client.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Maps a barrier id to its pending-set key
    pub key_mapper: KeyMapper,
    /// Trace every token added and removed
    pub verbose: bool,
}

/// On-disk form of [`Config`]
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    key_prefix: Option<String>,
    verbose: Option<bool>,
}

impl Config {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the key mapper
    pub fn with_key_mapper(mut self, key_mapper: KeyMapper) -> Self {
        self.key_mapper = key_mapper;
        self
    }

    /// Use a fixed prefix for pending-set keys
    pub fn with_key_prefix(self, prefix: impl Into<String>) -> Self {
        self.with_key_mapper(KeyMapper::prefixed(prefix))
    }

    /// Toggle per-token tracing
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Pending-set key for `id`
    pub fn set_key(&self, id: &str) -> String {
        self.key_mapper.set_key(id)
    }

    /// Parse a TOML document over the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(Self::default().merge(file))
    }

    /// Load a TOML file over the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply `DEFERRED_*` environment overrides
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from(self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let verbose = lookup(ENV_VERBOSE)
            .map(|raw| parse_bool(ENV_VERBOSE, &raw))
            .transpose()?;
        Ok(self.merge(ConfigFile {
            key_prefix: lookup(ENV_KEY_PREFIX),
            verbose,
        }))
    }

    fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(prefix) = file.key_prefix {
            self = self.with_key_prefix(prefix);
        }
        if let Some(verbose) = file.verbose {
            self.verbose = verbose;
        }
        self
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::InvalidConfig(format!(
            "{}: expected a boolean, got '{}'",
            name, other
        ))),
    }
}
