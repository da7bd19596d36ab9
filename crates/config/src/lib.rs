//! Configuration for toucan-client.
//!
//! Values are merged from, lowest priority first:
//! 1. built-in defaults,
//! 2. a config file (TOML, YAML or JSON, picked by extension),
//! 3. environment variables prefixed with `TOUCAN_`, where `__` separates
//!    nested keys (`TOUCAN_AUTH__TOKEN`, `TOUCAN_LOG__LEVEL`).

pub mod error;

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ErrorKind, Result};

pub const ENV_PREFIX: &str = "TOUCAN_";
const DEFAULT_CACHE_PATH: &str = "extraction_cache";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project URL; each instance lives at `<base_url>/<instance>`.
    pub base_url: String,
    pub instances: Vec<String>,
    pub stage: Option<String>,
    pub cache_path: PathBuf,
    pub auth: Option<AuthConfig>,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            instances: Vec::new(),
            stage: None,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            auth: None,
            log: LogConfig::default(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthConfig {
    Basic {
        username: String,
        #[serde(default)]
        password: Option<String>,
    },
    Token {
        token: String,
    },
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f.debug_struct("Basic").field("username", username).finish_non_exhaustive(),
            Self::Token { .. } => f.debug_struct("Token").finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// An `EnvFilter` directive, e.g. `info` or `toucan_cache=debug`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Default config file location, e.g. `~/.config/toucan/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "toucantoco", "toucan").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The layered provider chain, without extracting.
    ///
    /// A missing file contributes nothing.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = match file.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => figment.merge(Toml::file(file)),
            };
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads and validates the configuration.
    ///
    /// An explicit `file` must exist; without one, the default location is
    /// used when present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(file) if !file.is_file() => {
                exn::bail!(ErrorKind::Invalid(format!("config file not found: {}", file.display())))
            },
            Some(file) => Some(file.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        debug!(file = ?file, "loading configuration");
        let config: Self = Self::figment(file.as_deref()).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("base_url must not be empty".to_string()));
        }
        if let Some(name) = self.instances.iter().find(|name| name.is_empty() || name.contains('/')) {
            exn::bail!(ErrorKind::Invalid(format!("invalid instance name: {name:?}")));
        }
        Ok(())
    }
}
