use crate::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_TABLE: &str = "cpl_api_logs";
/// Most recent rows pulled per refresh
pub const DEFAULT_ROW_LIMIT: u32 = 50_000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 120;

/// Partially specified database settings from one source
///
/// Layers (environment, config file) are merged field by field before the
/// result is validated into a [`DbConfig`].
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSettings {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub row_limit: Option<u32>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
}

impl DbSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through a key lookup (`DB_HOST`, `DB_PORT`, `DB_USER`,
    /// `DB_PASS`, `DB_NAME`, `DB_TABLE`). Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("DB_PORT") {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|e| {
                FetchError::InvalidSetting {
                    field: "DB_PORT".to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            host: get("DB_HOST"),
            port,
            user: get("DB_USER"),
            password: get("DB_PASS"),
            database: get("DB_NAME"),
            table: get("DB_TABLE"),
            ..Self::default()
        })
    }

    /// Load settings from a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading database settings from: {}", path.display());
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: DbSettings) -> Self {
        Self {
            host: self.host.or(fallback.host),
            port: self.port.or(fallback.port),
            user: self.user.or(fallback.user),
            password: self.password.or(fallback.password),
            database: self.database.or(fallback.database),
            table: self.table.or(fallback.table),
            row_limit: self.row_limit.or(fallback.row_limit),
            connect_timeout_secs: self.connect_timeout_secs.or(fallback.connect_timeout_secs),
            cache_ttl_secs: self.cache_ttl_secs.or(fallback.cache_ttl_secs),
        }
    }

    /// Validate into a complete configuration
    pub fn resolve(self) -> Result<DbConfig> {
        let host = required(self.host, "DB_HOST")?;
        let user = required(self.user, "DB_USER")?;
        let password = required(self.password, "DB_PASS")?;
        let database = required(self.database, "DB_NAME")?;

        let table = self.table.unwrap_or_else(|| DEFAULT_TABLE.to_string());
        if !is_identifier(&table) {
            return Err(FetchError::InvalidSetting {
                field: "DB_TABLE".to_string(),
                reason: format!("'{}' is not a plain table name", table),
            });
        }

        let row_limit = self.row_limit.unwrap_or(DEFAULT_ROW_LIMIT);
        if row_limit == 0 {
            return Err(FetchError::InvalidSetting {
                field: "rowLimit".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(DbConfig {
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            user,
            password,
            database,
            table,
            row_limit,
            connect_timeout: Duration::from_secs(
                self.connect_timeout_secs
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS)),
        })
    }
}

impl fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Complete connection settings for the log store
#[derive(Clone, PartialEq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table: String,
    pub row_limit: u32,
    pub connect_timeout: Duration,
    pub cache_ttl: Duration,
}

impl DbConfig {
    /// Environment first, then the config file (explicit path or the
    /// per-user default location, when it exists)
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let env = DbSettings::from_env()?;

        let file = match config_file {
            Some(path) => DbSettings::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => DbSettings::from_file(&path)?,
                None => DbSettings::default(),
            },
        };

        let config = env.or(file).resolve()?;
        tracing::debug!("Resolved database config: {:?}", config);
        Ok(config)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("row_limit", &self.row_limit)
            .field("connect_timeout", &self.connect_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// `<config dir>/apiwatch/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("apiwatch").join("config.json"))
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value.ok_or_else(|| FetchError::Misconfigured(field.to_string()))
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
