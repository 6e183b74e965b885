//! Runtime configuration from the environment (and `.env`, loaded by the binary).

use std::env;

pub const DEFAULT_DATA_SOURCE: &str = "cleaned_data.csv";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LOG_FILE: &str = "logs/aqi_rater.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// CSV path or `http(s)://` URL of the measurement table.
    pub data_source: String,
    /// Optional JSON file overriding the scoring tables.
    pub tables_path: Option<String>,
    pub port: u16,
    pub log_file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            tables_path: None,
            port: DEFAULT_PORT,
            log_file_path: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_source: lookup("AQI_DATA_SOURCE").unwrap_or(defaults.data_source),
            tables_path: lookup("AQI_TABLES_PATH").filter(|p| !p.is_empty()),
            port: lookup("AQI_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            log_file_path: lookup("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
        }
    }
}
