// src/config.rs

use anyhow::{bail, Context};
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub log_filter: String,
}

pub const DEFAULT_LOG_FILTER: &str = "housekeeping_api=debug,tower_http=info";

impl Config {
    /// Reads the process environment (after `.env`, if the caller loaded one).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DATABASE_MAX_CONNECTIONS must be a number")?,
            None => 10,
        };
        let port = match get("PORT") {
            Some(v) => v.parse().context("PORT must be a port number")?,
            None => 8080,
        };
        let log_format = match get("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be 'pretty' or 'json', got '{other}'"),
        };

        Ok(Config {
            database_url,
            max_connections,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            log_format,
            log_filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
