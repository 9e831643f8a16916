//! Configuration loaded from environment variables.
//!
//! Binaries call `dotenvy::dotenv().ok()` first so a local `.env` file can
//! supply these values during development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

/// Default upper bound on pooled database connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Default time to wait for a pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Default directory for uploaded files, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "UploadedFiles";

/// Database connection settings.
///
/// | Env Var                   | Default  |
/// |---------------------------|----------|
/// | `DATABASE_URL`            | required |
/// | `DB_MAX_CONNECTIONS`      | `20`     |
/// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`      |
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| CoreError::InvalidArgument("DATABASE_URL must be set".into()))?;

        let max_connections =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(CoreError::InvalidArgument(
                "DB_MAX_CONNECTIONS must be at least 1".into(),
            ));
        }
        let acquire_timeout_secs =
            parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", DEFAULT_ACQUIRE_TIMEOUT_SECS)?;

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }
}

/// File storage settings.
///
/// | Env Var      | Default         |
/// |--------------|-----------------|
/// | `UPLOAD_DIR` | `UploadedFiles` |
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let upload_dir = lookup("UPLOAD_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into());
        Self {
            upload_dir: PathBuf::from(upload_dir),
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, CoreError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidArgument(format!("{key} must be a number, got '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn db_defaults() {
        let cfg = DbConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x/y")])).unwrap();
        assert_eq!(cfg.database_url, "postgres://x/y");
        assert_eq!(cfg.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(cfg.acquire_timeout, Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS));
    }

    #[test]
    fn db_url_required() {
        assert_matches!(
            DbConfig::from_lookup(lookup(&[])),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[test]
    fn db_overrides() {
        let cfg = DbConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_ACQUIRE_TIMEOUT_SECS", " 9 "),
        ]))
        .unwrap();
        assert_eq!(cfg.max_connections, 4);
        assert_eq!(cfg.acquire_timeout, Duration::from_secs(9));
    }

    #[test]
    fn malformed_number_rejected() {
        assert_matches!(
            DbConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://x/y"),
                ("DB_MAX_CONNECTIONS", "many"),
            ])),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[test]
    fn upload_dir_default_and_override() {
        assert_eq!(
            StorageConfig::from_lookup(lookup(&[])).upload_dir,
            PathBuf::from(DEFAULT_UPLOAD_DIR)
        );
        assert_eq!(
            StorageConfig::from_lookup(lookup(&[("UPLOAD_DIR", "/srv/files")])).upload_dir,
            PathBuf::from("/srv/files")
        );
    }
}
