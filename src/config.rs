//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory (or `--config PATH`)
//! 3. `WIPEFINITY_*` environment variables
//! 4. Command-line flags ([`Config::merge_cli`])
//!
//! ```toml
//! log_file = "/var/log/wipefinity.log"
//! chunk_size = 1048576
//! default_method = "secure"
//! confirm = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands, MethodArg};
use crate::erase::{EngineConfig, DEFAULT_CHUNK_SIZE};
use crate::oplog::DEFAULT_LOG_FILE;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "WIPEFINITY_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Operational log file.
    pub log_file: PathBuf,
    /// Bytes per overwrite chunk.
    pub chunk_size: usize,
    /// Method used when `--method` is not given.
    pub default_method: Option<MethodArg>,
    /// Ask before erasing.
    pub confirm: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_method: None,
            confirm: true,
        }
    }
}

impl Config {
    /// Load from the platform default location, then the environment.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No platform config directory, using defaults and environment");
                Self::extract(Self::figment(None))
            }
        }
    }

    /// Load from an explicit TOML file, then the environment.
    ///
    /// A missing file is not an error. A malformed one is logged and the
    /// defaults are used instead.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        Self::extract(Self::figment(Some(path.as_ref())))
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn extract(figment: Figment) -> Self {
        match figment.extract::<Self>() {
            Ok(config) => config.normalized(),
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn normalized(mut self) -> Self {
        self.chunk_size = self.chunk_size.max(1);
        self
    }

    /// Apply command-line overrides.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(ref path) = cli.log_file {
            self.log_file = path.clone();
        }

        match &cli.command {
            Commands::Erase(args) => {
                if let Some(size) = args.chunk_size {
                    self.chunk_size = usize::try_from(size).unwrap_or(usize::MAX).max(1);
                }
                if args.yes {
                    self.confirm = false;
                }
            }
        }
    }

    /// Engine settings derived from this configuration.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().with_chunk_size(self.chunk_size)
    }

    /// Platform-specific path of `config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "wipefinity", "wipefinity")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
