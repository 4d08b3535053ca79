use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use facebluff_db::PoolConfig;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub pool: PoolConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = var("FACEBLUFF_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("FACEBLUFF_JWT_SECRET is unset or still a placeholder");
        }

        let host = var("FACEBLUFF_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&var, "FACEBLUFF_PORT", 3000)?;
        let db_path: PathBuf = var("FACEBLUFF_DB_PATH")
            .unwrap_or_else(|| "facebluff.db".into())
            .into();

        let mut pool = PoolConfig::new(db_path);
        pool.max_connections = parse_or(&var, "FACEBLUFF_DB_MAX_CONNECTIONS", 4)?;
        pool.acquire_timeout =
            Duration::from_millis(parse_or(&var, "FACEBLUFF_DB_ACQUIRE_TIMEOUT_MS", 5000)?);
        pool.query_timeout =
            Duration::from_millis(parse_or(&var, "FACEBLUFF_DB_QUERY_TIMEOUT_MS", 10_000)?);
        if pool.max_connections == 0 {
            bail!("FACEBLUFF_DB_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            host,
            port,
            jwt_secret,
            pool,
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
