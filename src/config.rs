//! Runtime configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);
const DEFAULT_DATA_PATH: &str = "data/expenses.json";

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (`EXPENSE_TRACKER_ADDR`).
    pub bind_addr: SocketAddr,
    /// Path of the JSON expense document (`EXPENSE_TRACKER_DATA`).
    pub data_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr = env::var("EXPENSE_TRACKER_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_ADDR));

        let data_path = env::var("EXPENSE_TRACKER_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        Self { bind_addr, data_path }
    }
}
