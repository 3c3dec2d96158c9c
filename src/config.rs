use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// Directory holding the CSV exports of the record store.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    /// Reads `PROGRESS_BIND_ADDR`, `PROGRESS_PORT` and `PROGRESS_DATA_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("PROGRESS_BIND_ADDR").filter(|a| !a.trim().is_empty()) {
            config.bind_addr = addr.trim().to_string();
        }

        if let Some(raw) = lookup("PROGRESS_PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => warn!("Ignoring invalid PROGRESS_PORT '{}', using {}", raw, DEFAULT_PORT),
            }
        }

        if let Some(dir) = lookup("PROGRESS_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }

        config
    }
}
