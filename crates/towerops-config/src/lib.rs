//! Configuration for TowerOps clients.
//!
//! TOML profiles, token resolution (env + plaintext), and translation to
//! `towerops_core::ClientConfig`. Nothing else in the workspace reads files
//! or the environment; callers load here and pass the result in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use towerops_core::ClientConfig;

/// Environment variable consulted when a profile names no `token_env`.
pub const TOKEN_ENV: &str = "TOWEROPS_TOKEN";

const ENV_PREFIX: &str = "TOWEROPS_";
const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing TowerOps API token for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Profile used when the caller names none.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named TowerOps account.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Profile {
    /// API base URL. Omit for the production service.
    pub base_url: Option<String>,

    /// API token (plaintext; prefer `token_env`).
    pub token: Option<String>,

    /// Environment variable holding the API token.
    pub token_env: Option<String>,

    /// Override timeout in seconds.
    pub timeout: Option<u64>,
}

impl Config {
    /// Pick a profile by name, falling back to `default_profile`.
    ///
    /// The default profile may be missing from the file entirely; an empty
    /// one is used so environment-only setups still work.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
            .to_owned();

        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile.clone())),
            None if name == DEFAULT_PROFILE => Ok((name, Profile::default())),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "towerops", "towerops").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("towerops");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file is not an error.
///
/// Nested keys come from the environment with `__` separators, e.g.
/// `TOWEROPS_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API token: the profile's `token_env`, then
/// [`TOKEN_ENV`], then the plaintext `token`. Empty values don't count.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    // 1. Profile's token_env → env var lookup
    if let Some(token) = profile.token_env.as_deref().and_then(from_env) {
        return Ok(SecretString::from(token));
    }

    // 2. Well-known env var
    if let Some(token) = from_env(TOKEN_ENV) {
        return Ok(SecretString::from(token));
    }

    // 3. Plaintext in config
    if let Some(token) = profile.token.as_ref().filter(|t| !t.is_empty()) {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `ClientConfig` from a profile.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let token = resolve_token(profile, profile_name)?;

    let timeout_secs = profile.timeout.unwrap_or(defaults.timeout);
    if timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let mut config = ClientConfig::new(token).with_timeout(Duration::from_secs(timeout_secs));
    if let Some(ref raw) = profile.base_url {
        let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
        config = config.with_base_url(url);
    }
    Ok(config)
}

/// Load config and build the `ClientConfig` for `profile` (or the default).
pub fn load_client_config(profile: Option<&str>) -> Result<ClientConfig, ConfigError> {
    let cfg = load_config()?;
    let (name, profile) = cfg.profile(profile)?;
    profile_to_client_config(&profile, &name, &cfg.defaults)
}
