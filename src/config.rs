use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub blog: BlogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
    /// Upper bound for a single store operation
    pub query_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Category used when a post is created without one
    pub default_category_id: i64,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            busy_timeout_ms: 5_000,
            query_timeout_ms: 5_000,
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// SQLite busy timeout, capped by the query timeout so a blocked write
    /// gives up inside the store rather than outliving its caller.
    pub fn lock_wait(&self) -> Duration {
        self.busy_timeout().min(self.query_timeout())
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self { default_category_id: 1 }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = DatabaseConfig::new("sqlite:blog.db");
        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.url),
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
                busy_timeout_ms: env_or("DATABASE_BUSY_TIMEOUT_MS", defaults.busy_timeout_ms),
                query_timeout_ms: env_or("QUERY_TIMEOUT_MS", defaults.query_timeout_ms),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_or("SERVER_PORT", 3000),
                static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            },
            blog: BlogConfig {
                default_category_id: env_or("DEFAULT_CATEGORY_ID", 1),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
