//! Application state for the API server

use std::sync::Arc;

use groot_core::{Coordinator, QueryExecutor};

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Write-path coordinator
    pub coordinator: Arc<Coordinator>,
    /// Read-path query executor
    pub executor: Arc<QueryExecutor>,
    /// API version
    pub version: String,
}

impl AppState {
    pub fn new(coordinator: Arc<Coordinator>, executor: Arc<QueryExecutor>) -> Self {
        Self {
            coordinator,
            executor,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}
