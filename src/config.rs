// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] loaded from the environment once at startup. The loaded
//! configuration is immutable for the lifetime of the process.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the embedded database | `./data` |
//! | `JWT_SIGNING_KEY` | HMAC key for access tokens (>= 32 bytes) | Required |
//! | `REFRESH_TOKEN_KEY` | AES-256-GCM key for refresh tokens (32 bytes, raw or base64) | Required |
//! | `JWT_ISSUER` | Issuer claim written into and required from access tokens | `outlet-admin` |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime | `900` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh window | `604800` |
//! | `BCRYPT_COST` | bcrypt work factor for new password hashes | `12` |
//! | `LDAP_HOST` | Directory authenticator host (unset disables it) | Optional |
//! | `LDAP_PORT` | Directory authenticator port | `389` |
//! | `LDAP_TIMEOUT_SECS` | Directory dial timeout | `5` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use base64ct::{Base64, Encoding};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// The embedded database file lives directly under this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const JWT_SIGNING_KEY_ENV: &str = "JWT_SIGNING_KEY";
pub const REFRESH_TOKEN_KEY_ENV: &str = "REFRESH_TOKEN_KEY";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TOKEN_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const LDAP_HOST_ENV: &str = "LDAP_HOST";
pub const LDAP_PORT_ENV: &str = "LDAP_PORT";
pub const LDAP_TIMEOUT_ENV: &str = "LDAP_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_ISSUER: &str = "outlet-admin";
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_BCRYPT_COST: u32 = 12;
pub const DEFAULT_LDAP_PORT: u16 = 389;
pub const DEFAULT_LDAP_TIMEOUT_SECS: u64 = 5;

/// Database file name inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "outlet-admin.redb";

/// Shortest accepted HMAC signing key.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// AES-256-GCM key length.
pub const ENCRYPTION_KEY_LEN: usize = 32;

/// Errors raised while loading configuration. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Directory authenticator endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl DirectoryConfig {
    /// `ldap://host:port` URL used to dial the directory.
    pub fn url(&self) -> String {
        format!("ldap://{}:{}", self.host, self.port)
    }
}

/// Process-wide configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub signing_key: Vec<u8>,
    pub encryption_key: Vec<u8>,
    pub issuer: String,
    pub access_ttl: chrono::Duration,
    pub refresh_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub directory: Option<DirectoryConfig>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("signing_key", &"[redacted]")
            .field("encryption_key", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("directory", &self.directory)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let signing_key = get(JWT_SIGNING_KEY_ENV)
            .ok_or(ConfigError::Missing(JWT_SIGNING_KEY_ENV))?
            .into_bytes();
        if signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SIGNING_KEY_ENV,
                reason: format!("must be at least {MIN_SIGNING_KEY_LEN} bytes"),
            });
        }

        let encryption_key = parse_encryption_key(
            &get(REFRESH_TOKEN_KEY_ENV).ok_or(ConfigError::Missing(REFRESH_TOKEN_KEY_ENV))?,
        )?;

        let access_ttl_secs: i64 = parse_or(get(ACCESS_TOKEN_TTL_ENV), ACCESS_TOKEN_TTL_ENV, DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl_secs: i64 = parse_or(get(REFRESH_TOKEN_TTL_ENV), REFRESH_TOKEN_TTL_ENV, DEFAULT_REFRESH_TTL_SECS)?;
        for (name, secs) in [
            (ACCESS_TOKEN_TTL_ENV, access_ttl_secs),
            (REFRESH_TOKEN_TTL_ENV, refresh_ttl_secs),
        ] {
            if secs <= 0 {
                return Err(ConfigError::Invalid {
                    name,
                    reason: "must be a positive number of seconds".to_string(),
                });
            }
        }

        let bcrypt_cost: u32 = parse_or(get(BCRYPT_COST_ENV), BCRYPT_COST_ENV, DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: BCRYPT_COST_ENV,
                reason: "must be between 4 and 31".to_string(),
            });
        }

        let directory = match get(LDAP_HOST_ENV) {
            Some(host) => Some(DirectoryConfig {
                host,
                port: parse_or(get(LDAP_PORT_ENV), LDAP_PORT_ENV, DEFAULT_LDAP_PORT)?,
                timeout: Duration::from_secs(parse_or(
                    get(LDAP_TIMEOUT_ENV),
                    LDAP_TIMEOUT_ENV,
                    DEFAULT_LDAP_TIMEOUT_SECS,
                )?),
            }),
            None => None,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?,
            data_dir: PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            signing_key,
            encryption_key,
            issuer: get(JWT_ISSUER_ENV).unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
            access_ttl: chrono::Duration::seconds(access_ttl_secs),
            refresh_ttl: chrono::Duration::seconds(refresh_ttl_secs),
            bcrypt_cost,
            directory,
            log_format,
        })
    }

    /// Path of the embedded database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Accepts either exactly 32 raw bytes or base64 that decodes to 32 bytes.
fn parse_encryption_key(raw: &str) -> Result<Vec<u8>, ConfigError> {
    if raw.len() == ENCRYPTION_KEY_LEN {
        return Ok(raw.as_bytes().to_vec());
    }
    match Base64::decode_vec(raw.trim()) {
        Ok(bytes) if bytes.len() == ENCRYPTION_KEY_LEN => Ok(bytes),
        _ => Err(ConfigError::Invalid {
            name: REFRESH_TOKEN_KEY_ENV,
            reason: format!("must be {ENCRYPTION_KEY_LEN} bytes, raw or base64-encoded"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SIGNING: &str = "0123456789abcdef0123456789abcdef";
    const ENCRYPTION: &str = "abcdefghijklmnopqrstuvwxyz012345";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_keys_are_set() {
        let config = AppConfig::from_lookup(lookup(&[
            (JWT_SIGNING_KEY_ENV, SIGNING),
            (REFRESH_TOKEN_KEY_ENV, ENCRYPTION),
        ]))
        .unwrap();

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.issuer, DEFAULT_ISSUER);
        assert_eq!(config.access_ttl, chrono::Duration::seconds(900));
        assert_eq!(config.refresh_ttl, chrono::Duration::days(7));
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
        assert!(config.directory.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.database_path().ends_with(DATABASE_FILE));
    }

    #[test]
    fn missing_signing_key_is_fatal() {
        let result = AppConfig::from_lookup(lookup(&[(REFRESH_TOKEN_KEY_ENV, ENCRYPTION)]));
        assert!(matches!(result, Err(ConfigError::Missing(JWT_SIGNING_KEY_ENV))));
    }

    #[test]
    fn short_signing_key_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            (JWT_SIGNING_KEY_ENV, "short"),
            (REFRESH_TOKEN_KEY_ENV, ENCRYPTION),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: JWT_SIGNING_KEY_ENV, .. })
        ));
    }

    #[test]
    fn encryption_key_accepts_base64() {
        let encoded = Base64::encode_string(&[7u8; 32]);
        let config = AppConfig::from_lookup(lookup(&[
            (JWT_SIGNING_KEY_ENV, SIGNING),
            (REFRESH_TOKEN_KEY_ENV, &encoded),
        ]))
        .unwrap();
        assert_eq!(config.encryption_key, vec![7u8; 32]);
    }

    #[test]
    fn encryption_key_of_wrong_length_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            (JWT_SIGNING_KEY_ENV, SIGNING),
            (REFRESH_TOKEN_KEY_ENV, "too-short"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: REFRESH_TOKEN_KEY_ENV, .. })
        ));
    }

    #[test]
    fn directory_is_enabled_by_host() {
        let config = AppConfig::from_lookup(lookup(&[
            (JWT_SIGNING_KEY_ENV, SIGNING),
            (REFRESH_TOKEN_KEY_ENV, ENCRYPTION),
            (LDAP_HOST_ENV, "ldap.internal"),
            (LDAP_PORT_ENV, "1389"),
        ]))
        .unwrap();
        let directory = config.directory.unwrap();
        assert_eq!(directory.url(), "ldap://ldap.internal:1389");
        assert_eq!(directory.timeout, Duration::from_secs(DEFAULT_LDAP_TIMEOUT_SECS));
    }

    #[test]
    fn unparseable_numbers_are_errors() {
        let result = AppConfig::from_lookup(lookup(&[
            (JWT_SIGNING_KEY_ENV, SIGNING),
            (REFRESH_TOKEN_KEY_ENV, ENCRYPTION),
            (PORT_ENV, "eighty"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: PORT_ENV, .. })));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let config = AppConfig::from_lookup(lookup(&[
            (JWT_SIGNING_KEY_ENV, SIGNING),
            (REFRESH_TOKEN_KEY_ENV, ENCRYPTION),
        ]))
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains(SIGNING));
        assert!(!debug.contains(ENCRYPTION));
    }
}
