//! Configuration for decode-syseeprom.
//!
//! Values are merged from three layers, later layers winning:
//!
//! 1. compiled defaults ([`Config::default()`]),
//! 2. the TOML file at [`DEFAULT_CONFIG_PATH`] (optional; a missing file is
//!    not an error),
//! 3. environment variables prefixed `SYSEEPROM_`, with nested keys separated
//!    by `__` (e.g. `SYSEEPROM_CACHE__ROOT=/tmp/cache`).
//!
//! Nothing here is user-supplied on the command line: cache locations are
//! fixed per system, chosen by whoever writes the configuration file.

pub mod error;
mod validate;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/decode-syseeprom.toml";
pub const ENV_PREFIX: &str = "SYSEEPROM_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Refuse to run unless the effective user is root.
    pub require_root: bool,
    pub cache: CacheConfig,
    pub platform: PlatformConfig,
    pub board: BoardConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            require_root: true,
            cache: CacheConfig::default(),
            platform: PlatformConfig::default(),
            board: BoardConfig::default(),
        }
    }
}

/// Where the EEPROM cache record lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding every cache record. Cleared wholesale on `--init`.
    pub root: PathBuf,
    /// File name of the record within [`root`](Self::root).
    pub name: String,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/var/cache/sonic/decode-syseeprom"),
            name: "syseeprom_cache".to_string(),
        }
    }
}
impl CacheConfig {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { root: root.into(), name: name.into() }
    }

    /// Full path of the cache record.
    pub fn record(&self) -> PathBuf {
        self.root.join(&self.name)
    }
}

/// How the running platform is identified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// `key=value` file written by the installer.
    pub machine_conf: PathBuf,
    /// Skip detection and use this platform identifier.
    pub name: Option<String>,
}
impl Default for PlatformConfig {
    fn default() -> Self {
        Self { machine_conf: PathBuf::from("/host/machine.conf"), name: None }
    }
}

/// Settings handed to the selected board driver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Select a driver by registry name instead of by platform.
    pub driver: Option<String>,
    /// EEPROM device node or image file read by the driver.
    pub eeprom: PathBuf,
    /// SQLite state database backing the database tier. No database tier
    /// when unset.
    pub state_db: Option<PathBuf>,
}
impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            driver: None,
            eeprom: PathBuf::from("/etc/sonic/virtual-syseeprom.bin"),
            state_db: None,
        }
    }
}

impl Config {
    /// Load from the default file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load from `path` (if it exists) and the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading configuration");
        Self::from_figment(Self::figment(path))
    }

    /// The layered configuration sources, before extraction.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from arbitrary sources.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validate::absolute("cache.root", &self.cache.root)?;
        validate::record_name("cache.name", &self.cache.name)?;
        validate::absolute("platform.machine_conf", &self.platform.machine_conf)?;
        if let Some(name) = &self.platform.name {
            validate::not_blank("platform.name", name)?;
        }
        if let Some(driver) = &self.board.driver {
            validate::not_blank("board.driver", driver)?;
        }
        validate::absolute("board.eeprom", &self.board.eeprom)?;
        if let Some(state_db) = &self.board.state_db {
            validate::absolute("board.state_db", state_db)?;
        }
        Ok(())
    }
}
