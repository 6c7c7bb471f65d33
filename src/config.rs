//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_BCRYPT_ROUNDS, DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_MAX_TOTAL_FILES_SIZE, DEFAULT_MEMORY_LIMIT, DEFAULT_MIN_SECURITY_SCORE,
    DEFAULT_RUN_TIMEOUT_SECONDS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub docker: DockerConfig,
    pub execution: ExecutionConfig,
    pub limits: LimitsConfig,
    pub deployment: DeploymentConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub allowed_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub bcrypt_rounds: u32,
}

/// Docker configuration for sandbox containers
#[derive(Debug, Clone)]
pub struct DockerConfig {
    pub socket_path: String,
    pub network_disabled: bool,
}

/// Execution limits applied to each sandbox run
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Default wall-clock limit in seconds (per-problem override wins)
    pub run_timeout_seconds: u64,
    /// Default memory limit as a docker-style size string ("512m")
    pub memory_limit: String,
}

/// Request payload limits
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_file_size: usize,
    pub max_total_files_size: usize,
}

/// Deployment validation gate configuration
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub enabled: bool,
    pub min_security_score: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            docker: DockerConfig::from_env()?,
            execution: ExecutionConfig::from_env()?,
            limits: LimitsConfig::from_env()?,
            deployment: DeploymentConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

impl DatabaseConfig {
    /// `DATABASE_URL` wins; otherwise the URL is assembled from the DB_* parts.
    fn from_env() -> Result<Self, ConfigError> {
        let url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
                let user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
                let pass = env::var("DB_PASS").unwrap_or_default();
                let name = env::var("DB_NAME").unwrap_or_else(|_| "codejudge".to_string());
                let port: u16 = env::var("DB_PORT")
                    .unwrap_or_else(|_| "5432".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("DB_PORT".to_string()))?;
                format!("postgres://{user}:{pass}@{host}:{port}/{name}")
            }
        };

        Ok(Self {
            url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DATABASE_MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?,
            bcrypt_rounds: env::var("BCRYPT_ROUNDS")
                .unwrap_or_else(|_| DEFAULT_BCRYPT_ROUNDS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BCRYPT_ROUNDS".to_string()))?,
        })
    }
}

impl DockerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            socket_path: env::var("DOCKER_SOCKET")
                .unwrap_or_else(|_| "/var/run/docker.sock".to_string()),
            network_disabled: env::var("DOCKER_NETWORK_DISABLED")
                .map(|v| v == "true" || v == "True" || v == "1")
                .unwrap_or(false),
        })
    }
}

impl ExecutionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            run_timeout_seconds: env::var("RUN_TIMEOUT")
                .unwrap_or_else(|_| DEFAULT_RUN_TIMEOUT_SECONDS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RUN_TIMEOUT".to_string()))?,
            memory_limit: env::var("MEMORY_LIMIT")
                .unwrap_or_else(|_| DEFAULT_MEMORY_LIMIT.to_string()),
        })
    }
}

impl LimitsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MAX_FILE_SIZE".to_string()))?,
            max_total_files_size: env::var("MAX_TOTAL_FILES_SIZE")
                .unwrap_or_else(|_| DEFAULT_MAX_TOTAL_FILES_SIZE.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MAX_TOTAL_FILES_SIZE".to_string()))?,
        })
    }
}

impl DeploymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: env::var("ENABLE_DEPLOYMENT_VALIDATION")
                .map(|v| v == "true" || v == "True" || v == "1")
                .unwrap_or(true),
            min_security_score: env::var("MIN_SECURITY_SCORE")
                .unwrap_or_else(|_| DEFAULT_MIN_SECURITY_SCORE.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MIN_SECURITY_SCORE".to_string()))?,
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 5000);
    }

    #[test]
    fn test_execution_defaults() {
        let exec = ExecutionConfig {
            run_timeout_seconds: DEFAULT_RUN_TIMEOUT_SECONDS,
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
        };
        assert_eq!(exec.run_timeout_seconds, 15);
        assert_eq!(exec.memory_limit, "512m");
    }
}
