//! Configuration management for the catalog server

use anyhow::{Context, Result};
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// MongoDB connection URL (default: mongodb://localhost:27017)
    #[serde(default = "default_mongodb_url")]
    pub mongodb_url: String,

    /// Database name (default: catalog)
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// CORS allowed origins (comma-separated). If empty, any origin is
    /// allowed (dev mode).
    pub cors_allowed_origins: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_mongodb_url() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database_name() -> String {
    "catalog".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_port);
        let mongodb_url = std::env::var("MONGODB_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .unwrap_or_else(|_| default_mongodb_url());
        let database_name =
            std::env::var("DATABASE_NAME").unwrap_or_else(|_| default_database_name());
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS").ok();

        Ok(Self {
            host,
            port,
            mongodb_url,
            database_name,
            cors_allowed_origins,
        })
    }

    /// Load configuration from a TOML file
    #[allow(dead_code)]
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mongodb_url: default_mongodb_url(),
            database_name: default_database_name(),
            cors_allowed_origins: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_name, "catalog");
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.mongodb_url, "mongodb://localhost:27017");
    }
}
