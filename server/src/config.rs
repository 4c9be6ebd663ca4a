//! Process configuration read from the environment.

use std::env;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_BUCKET: &str = "brinebook-photos";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5173,http://localhost:5174,http://localhost:3000";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
    pub session_ttl_days: i64,
    pub max_upload_bytes: usize,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    /// Custom S3-compatible endpoint. `None` means AWS.
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: String,
    pub region: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url =
            get("DATABASE_URL").ok_or(ConfigError::MissingEnvVar("DATABASE_URL"))?;

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(ServerConfig {
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cors_origins,
            session_ttl_days: parse_or(
                "SESSION_TTL_DAYS",
                get("SESSION_TTL_DAYS"),
                DEFAULT_SESSION_TTL_DAYS,
            )?,
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                get("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            storage: StorageConfig {
                endpoint_url: get("S3_ENDPOINT_URL").map(|u| u.trim_end_matches('/').to_string()),
                access_key_id: get("S3_ACCESS_KEY_ID"),
                secret_access_key: get("S3_SECRET_ACCESS_KEY"),
                bucket: get("S3_BUCKET_NAME").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                region: get("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            },
        })
    }
}

fn parse_or<T: FromStr + PartialOrd + Default>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) if parsed > T::default() => Ok(parsed),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/brinebook")]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.session_ttl_days, 7);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.cors_origins.len(), 3);
        assert_eq!(config.cors_origins[0], "http://localhost:5173");
        assert_eq!(config.storage.bucket, "brinebook-photos");
        assert_eq!(config.storage.region, "us-east-1");
        assert!(config.storage.endpoint_url.is_none());
    }

    #[test]
    fn test_database_url_required() {
        assert_eq!(
            config_from(&[]).unwrap_err(),
            ConfigError::MissingEnvVar("DATABASE_URL")
        );
        assert!(config_from(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("CORS_ORIGINS", "http://localhost:5173, https://brinebook.app,"),
            ("SESSION_TTL_DAYS", "30"),
            ("S3_ENDPOINT_URL", "http://minio:9000/"),
            ("S3_BUCKET_NAME", "photos"),
        ])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "https://brinebook.app"]
        );
        assert_eq!(config.session_ttl_days, 30);
        assert_eq!(config.storage.endpoint_url.as_deref(), Some("http://minio:9000"));
        assert_eq!(config.storage.bucket, "photos");
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let err = config_from(&[("DATABASE_URL", "postgres://db"), ("SESSION_TTL_DAYS", "0")])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "SESSION_TTL_DAYS",
                ..
            }
        ));

        let err = config_from(&[("DATABASE_URL", "postgres://db"), ("MAX_UPLOAD_BYTES", "lots")]);
        assert!(err.is_err());
    }
}
