//! Configuration for the OCP tools.
//!
//! TOML profiles, token resolution (profile, named env var, `OCP_TOKEN`),
//! and translation to the endpoint + `ocp_api::TransportConfig` pair the
//! GraphQL client is built from. The CLI layers its flag overrides on top.

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
use url::Url;

use ocp_api::{TlsMode, TransportConfig};

/// Portal GraphQL endpoint used when a profile names none.
pub const DEFAULT_ENDPOINT: &str = "https://ocpportal.int.tieto.com/v2/graphql/";

/// Environment variable consulted last for the API token.
pub const TOKEN_ENV: &str = "OCP_TOKEN";

const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(
        "no API token for profile '{profile}': either set the profile token or the OCP_TOKEN environment variable"
    )]
    NoToken { profile: String },

    #[error("profile '{name}' not found in {}", .path.display())]
    UnknownProfile { name: String, path: PathBuf },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named portal profiles.
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

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Skip certificate verification. The portal commonly runs with an
    /// internal CA, so this starts out on.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: default_insecure(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

/// A named portal profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// GraphQL endpoint URL. Falls back to [`DEFAULT_ENDPOINT`].
    pub endpoint: Option<String>,

    /// API token (plaintext; prefer `token_env`).
    pub token: Option<String>,

    /// Environment variable name containing the API token.
    pub token_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override the global insecure setting.
    pub insecure: Option<bool>,

    /// Override the global timeout, in seconds.
    pub timeout: Option<u64>,
}

impl Config {
    /// Pick a profile by name, then `default_profile`, then `"default"`.
    ///
    /// The implicit default profile may be absent from the file; it then
    /// resolves to an empty profile so env-only setups work.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE);

        match self.profiles.get(name) {
            Some(profile) => Ok((name.to_owned(), profile.clone())),
            None if name == DEFAULT_PROFILE => Ok((name.to_owned(), Profile::default())),
            None => Err(ConfigError::UnknownProfile {
                name: name.to_owned(),
                path: config_path(),
            }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ocp", "ocp").map_or_else(
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
    p.push("ocp");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Provider stack: defaults, then the TOML file, then `OCP_*` variables
/// (`OCP_DEFAULTS__TIMEOUT=60`, `OCP_DEFAULT_PROFILE=prod`).
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OCP_").ignore(&["TOKEN"]).split("__"))
}

/// Load the full Config from the platform config file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment(path).extract()?)
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the API token: profile `token`, then the variable named by
/// `token_env`, then `OCP_TOKEN`.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(token) = profile.token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(SecretString::from(token.to_owned()));
    }

    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    match std::env::var(TOKEN_ENV) {
        Ok(val) if !val.is_empty() => Ok(SecretString::from(val)),
        _ => Err(ConfigError::NoToken {
            profile: profile_name.into(),
        }),
    }
}

// ── Connection settings ─────────────────────────────────────────────

/// Everything needed to build a `GraphQlClient`.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub endpoint: Url,
    pub token: SecretString,
    pub transport: TransportConfig,
}

/// Build connection settings from a profile, with global defaults filling
/// what the profile leaves unset. No CLI flag overrides.
pub fn profile_to_connection(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionSettings, ConfigError> {
    let raw = profile.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
    let endpoint: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "endpoint".into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    let token = resolve_token(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ConnectionSettings {
        endpoint,
        token,
        transport: TransportConfig { tls, timeout },
    })
}
