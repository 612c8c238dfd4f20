use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};

use crate::feed::DEFAULT_FEED_URL;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Unset means rates are kept in memory only.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub listen_addr: SocketAddr,
    pub feed_url: String,
    pub feed_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("Invalid DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(5);
        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:4000".to_string())
            .parse::<SocketAddr>()
            .context("Invalid LISTEN_ADDR")?;
        let feed_url = lookup("FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let timeout_secs = lookup("FEED_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("Invalid FEED_TIMEOUT_SECS")?
            .unwrap_or(30);

        Ok(Self {
            database_url,
            database_max_connections,
            listen_addr,
            feed_url,
            feed_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
