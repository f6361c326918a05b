//! Server configuration from environment variables.
//!
//! # Responsibility
//! - Resolve bind address, database path, and logging settings with
//!   defaults suitable for local use.

use std::env;
use std::path::PathBuf;

/// Runtime settings for the alarm server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP address to bind, e.g. `127.0.0.1:8080`.
    pub bind_addr: String,
    /// SQLite database file path.
    pub db_path: PathBuf,
    /// Directory for rolling log files; must be absolute.
    pub log_dir: PathBuf,
    /// Log level handed to the core logger.
    pub log_level: String,
}

impl ServerConfig {
    /// Reads `CHIME_ADDR`, `CHIME_DB`, `CHIME_LOG_DIR`, and
    /// `CHIME_LOG_LEVEL`, falling back to local defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("CHIME_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            db_path: env::var("CHIME_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("chime.db")),
            log_dir: env::var("CHIME_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_log_dir()),
            log_level: env::var("CHIME_LOG_LEVEL")
                .unwrap_or_else(|_| chime_core::default_log_level().to_string()),
        }
    }
}

fn default_log_dir() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|_| env::temp_dir().join("chime-logs"))
}
