use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use parley_crypto::password::DEFAULT_WORK_FACTOR;

const DEV_SECRET: &str = "dev-secret-change-me";

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub work_factor: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret_key = var("PARLEY_SECRET_KEY").unwrap_or_else(|| {
            warn!("PARLEY_SECRET_KEY not set, using the development secret");
            DEV_SECRET.into()
        });
        let db_path = var("PARLEY_DB_PATH").unwrap_or_else(|| "parley.db".into());
        let host = var("PARLEY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("PARLEY_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("PARLEY_PORT must be a port number")?;
        let work_factor: u32 = match var("PARLEY_WORK_FACTOR") {
            Some(raw) => raw
                .parse()
                .context("PARLEY_WORK_FACTOR must be an integer")?,
            None => DEFAULT_WORK_FACTOR,
        };

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            secret_key,
            db_path: PathBuf::from(db_path),
            addr,
            work_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.secret_key, DEV_SECRET);
        assert_eq!(config.db_path, PathBuf::from("parley.db"));
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.work_factor, DEFAULT_WORK_FACTOR);
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PARLEY_SECRET_KEY", "s3cret"),
            ("PARLEY_DB_PATH", "/tmp/p.db"),
            ("PARLEY_HOST", "127.0.0.1"),
            ("PARLEY_PORT", "8080"),
            ("PARLEY_WORK_FACTOR", "10"),
        ]))
        .unwrap();
        assert_eq!(config.secret_key, "s3cret");
        assert_eq!(config.db_path, PathBuf::from("/tmp/p.db"));
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.work_factor, 10);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Config::from_lookup(lookup(&[("PARLEY_PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PARLEY_WORK_FACTOR", "high")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PARLEY_HOST", "not a host")])).is_err());
    }
}
