//! Configuration loading and validation.
//!
//! Values are layered, later layers winning:
//! 1. built-in defaults,
//! 2. a TOML file (`config.toml` in the platform config directory, or the
//!    file given explicitly),
//! 3. environment variables prefixed with `DEVBYTES_` (e.g. `DEVBYTES_TIMEOUT=5`).
//!
//! ```toml
//! database = "/home/me/.local/share/devbytes/videos.db"
//! endpoint = "https://android-kotlin-fun-mars-server.appspot.com/devbytes"
//! timeout = 30
//! connect_timeout = 10
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

const ENV_PREFIX: &str = "DEVBYTES_";
const DATABASE_FILE: &str = "videos.db";
const CONFIG_FILE: &str = "config.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "example", "devbytes")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding the offline cache.
    pub database: PathBuf,
    /// Playlist endpoint.
    pub endpoint: String,
    /// Whole-request timeout, in seconds.
    pub timeout: u64,
    /// Connection timeout, in seconds.
    pub connect_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        let database = match project_dirs() {
            Some(dirs) => dirs.data_dir().join(DATABASE_FILE),
            None => PathBuf::from(DATABASE_FILE),
        };
        Self {
            database,
            endpoint: devbytes_network::DEFAULT_ENDPOINT.to_string(),
            timeout: 30,
            connect_timeout: 10,
        }
    }
}

impl Config {
    /// Default location of the configuration file, if the platform has one.
    pub fn default_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Layered providers, before extraction.
    ///
    /// An explicit `file` must exist; the default file is optional.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match file {
            Some(file) if !file.is_file() => exn::bail!(ErrorKind::NotFound(file.to_path_buf())),
            Some(file) => figment = figment.merge(Toml::file(file)),
            None => {
                if let Some(default) = Self::default_file() {
                    figment = figment.merge(Toml::file(default));
                }
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load and validate the configuration.
    #[instrument(skip_all, fields(file = ?file))]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(file)?)
    }

    /// Extract and validate a configuration from any set of providers.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        tracing::debug!(database = %config.database.display(), endpoint = %config.endpoint, "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            exn::bail!(ErrorKind::InvalidValue("timeout"));
        }
        if self.connect_timeout == 0 {
            exn::bail!(ErrorKind::InvalidValue("connect_timeout"));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            exn::bail!(ErrorKind::InvalidValue("endpoint"));
        }
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::InvalidValue("database"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}
