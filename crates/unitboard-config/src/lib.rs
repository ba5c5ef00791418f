//! Shared configuration for unitboard frontends.
//!
//! TOML profiles, API key resolution (env + plaintext), and translation
//! to `unitboard_core::SyncConfig`. The CLI adds flag-aware wrappers on
//! top; core itself never reads files.

use std::collections::BTreeMap;
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

use unitboard_core::{
    BookedPolicy, Column, ColumnAliases, ExportFormat, SourceConfig, SourceFormat,
    SourceLocation, StatusVocabulary, SyncConfig, TlsVerification, UnitStatus,
};

/// Environment variable consulted for the API key when a profile does
/// not name its own.
pub const API_KEY_ENV: &str = "UNITBOARD_API_KEY";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "UNITBOARD_CONFIG";

const ENV_PREFIX: &str = "UNITBOARD_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' has neither `url` nor `sheet_id`")]
    NoSource { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

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
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named sheet profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, else the configured
    /// default, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Fetch timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between refreshes in `watch`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    15
}
fn default_refresh_interval() -> u64 {
    30
}

/// A named sheet profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Export URL, used verbatim.
    pub url: Option<String>,

    /// Google spreadsheet id; expanded to the table-query endpoint when
    /// `url` is not set.
    pub sheet_id: Option<String>,

    /// Tab name within the spreadsheet.
    pub sheet: Option<String>,

    /// Payload shape: "auto", "csv", or "json-table".
    pub format: Option<SourceFormat>,

    /// API key (plaintext; prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Query parameter the key is sent as. Defaults to `key`.
    pub api_key_param: Option<String>,

    /// Override refresh interval (seconds).
    pub refresh_interval: Option<u64>,

    /// Override fetch timeout (seconds).
    pub timeout: Option<u64>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Show `Booked` as part of `Sold` in counts.
    pub booked_as_sold: Option<bool>,

    /// Extra status spellings.
    #[serde(default, skip_serializing_if = "StatusAliasConfig::is_empty")]
    pub statuses: StatusAliasConfig,

    /// Extra header spellings.
    #[serde(default, skip_serializing_if = "ColumnAliasConfig::is_empty")]
    pub columns: ColumnAliasConfig,
}

/// `[profiles.X.statuses]`: extra spellings per canonical status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusAliasConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_hold: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub booked: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sold: Vec<String>,
}

impl StatusAliasConfig {
    pub fn is_empty(&self) -> bool {
        self.entries().all(|(_, aliases)| aliases.is_empty())
    }

    fn entries(&self) -> impl Iterator<Item = (UnitStatus, &[String])> {
        [
            (UnitStatus::Available, self.available.as_slice()),
            (UnitStatus::OnHold, self.on_hold.as_slice()),
            (UnitStatus::Booked, self.booked.as_slice()),
            (UnitStatus::Sold, self.sold.as_slice()),
        ]
        .into_iter()
    }

    /// Default vocabulary plus these extensions.
    pub fn to_vocabulary(&self) -> StatusVocabulary {
        let mut vocab = StatusVocabulary::default();
        for (status, aliases) in self.entries() {
            vocab.extend(status, aliases);
        }
        vocab
    }
}

/// `[profiles.X.columns]`: extra header spellings per canonical column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnAliasConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub floor: Vec<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub unit_type: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub area: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parking: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,
}

impl ColumnAliasConfig {
    pub fn is_empty(&self) -> bool {
        self.entries().all(|(_, aliases)| aliases.is_empty())
    }

    fn entries(&self) -> impl Iterator<Item = (Column, &[String])> {
        [
            (Column::Unit, self.unit.as_slice()),
            (Column::Floor, self.floor.as_slice()),
            (Column::Type, self.unit_type.as_slice()),
            (Column::Area, self.area.as_slice()),
            (Column::Parking, self.parking.as_slice()),
            (Column::Status, self.status.as_slice()),
        ]
        .into_iter()
    }

    /// Default header aliases plus these extensions.
    pub fn to_aliases(&self) -> ColumnAliases {
        let mut columns = ColumnAliases::default();
        for (column, aliases) in self.entries() {
            columns.extend(column, aliases);
        }
        columns
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `UNITBOARD_CONFIG`, else platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "unitboard", "unitboard").map_or_else(
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
    p.push("unitboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file (missing file → defaults) + environment.
///
/// Environment keys nest with a double underscore, e.g.
/// `UNITBOARD_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── API key resolution (without CLI flags) ──────────────────────────

/// Resolve the API key from the environment and the profile.
///
/// Order: the variable named by `api_key_env`, then `UNITBOARD_API_KEY`,
/// then the plaintext `api_key`. A missing key is not an error; most
/// published sheets need none.
pub fn resolve_api_key(profile: &Profile) -> Option<SecretString> {
    resolve_api_key_with(profile, |name| std::env::var(name).ok())
}

/// [`resolve_api_key`] with an injectable environment lookup.
pub fn resolve_api_key_with(
    profile: &Profile,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    let non_empty = |v: String| (!v.trim().is_empty()).then_some(v);

    profile
        .api_key_env
        .as_deref()
        .and_then(&env)
        .and_then(non_empty)
        .or_else(|| env(API_KEY_ENV).and_then(non_empty))
        .or_else(|| profile.api_key.clone().and_then(non_empty))
        .map(SecretString::from)
}

// ── Profile → SyncConfig ────────────────────────────────────────────

/// Build the source location a profile points at (without API key).
pub fn profile_source(
    profile: &Profile,
    profile_name: &str,
) -> Result<SourceLocation, ConfigError> {
    if let Some(ref url) = profile.url {
        return SourceLocation::parse(url).map_err(|e| ConfigError::Validation {
            field: "url".into(),
            reason: e.to_string(),
        });
    }
    if let Some(ref id) = profile.sheet_id {
        let export = match profile.format {
            Some(SourceFormat::JsonTable) => ExportFormat::Json,
            _ => ExportFormat::Csv,
        };
        return SourceLocation::google_sheet(id, profile.sheet.as_deref(), export).map_err(|e| {
            ConfigError::Validation {
                field: "sheet_id".into(),
                reason: e.to_string(),
            }
        });
    }
    Err(ConfigError::NoSource {
        profile: profile_name.into(),
    })
}

/// Build a `SyncConfig` from a profile: no CLI flag overrides.
pub fn profile_to_sync_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SyncConfig, ConfigError> {
    let mut location = profile_source(profile, profile_name)?;
    if let Some(key) = resolve_api_key(profile) {
        let param = profile.api_key_param.as_deref().unwrap_or("key");
        location = location.with_api_key(key, param);
    }

    let timeout_secs = profile.timeout.unwrap_or(defaults.timeout);
    if timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = SyncConfig::new(SourceConfig {
        location,
        format: profile.format.unwrap_or_default(),
    });
    config.tls = tls;
    config.request_timeout = Duration::from_secs(timeout_secs);
    config.fetch_timeout = Duration::from_secs(timeout_secs);
    config.refresh_interval =
        Duration::from_secs(profile.refresh_interval.unwrap_or(defaults.refresh_interval));
    config.booked_policy = if profile.booked_as_sold.unwrap_or(false) {
        BookedPolicy::MergeIntoSold
    } else {
        BookedPolicy::Distinct
    };
    config.columns = profile.columns.to_aliases();
    config.statuses = profile.statuses.to_vocabulary();
    Ok(config)
}
