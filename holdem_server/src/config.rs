//! Server configuration from environment variables with CLI
//! overrides.

use std::net::SocketAddr;
use std::str::FromStr;

const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP/WebSocket bind address.
    pub bind: SocketAddr,
    /// Cap on concurrently running tables.
    pub max_tables: usize,
}

impl ServerConfig {
    /// Load from the environment; CLI overrides win over env vars,
    /// env vars over defaults.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        max_tables_override: Option<usize>,
    ) -> Result<Self, String> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_or("SERVER_BIND", DEFAULT_BIND.parse().expect("default bind"))?,
        };
        let max_tables = match max_tables_override {
            Some(n) => n,
            None => parse_env_or("MAX_TABLES", holdem::table::DEFAULT_MAX_TABLES)?,
        };
        let config = Self { bind, max_tables };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_tables == 0 {
            return Err("MAX_TABLES must be at least 1".to_string());
        }
        Ok(())
    }
}

fn parse_env_or<T: FromStr>(var: &str, default: T) -> Result<T, String> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| format!("invalid value for {var}: {value:?}")),
        Err(_) => Ok(default),
    }
}
