//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use bollard::Docker;
use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{config::Config, judge::ExecutionEngine};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool
    pub db: PgPool,

    /// Redis connection manager (rate-limit counters)
    pub redis: ConnectionManager,

    /// Docker client shared by all sandboxes
    pub docker: Docker,

    /// Execution engine facade over the Docker client
    pub engine: ExecutionEngine,

    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: PgPool, redis: ConnectionManager, docker: Docker, config: Config) -> Self {
        let engine = ExecutionEngine::new(docker.clone(), config.clone());

        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                docker,
                engine,
                config,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    /// Get a reference to the Docker client
    pub fn docker(&self) -> &Docker {
        &self.inner.docker
    }

    /// Get a reference to the execution engine
    pub fn engine(&self) -> &ExecutionEngine {
        &self.inner.engine
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
