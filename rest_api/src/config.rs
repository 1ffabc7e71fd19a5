// rest_api/src/config.rs

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_DIR: &str = "./medirest_data";

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    pub data_directory: PathBuf,
}

/// Loads the REST API configuration from the environment, falling back
/// to defaults. Recognized variables: MEDIREST_HOST, MEDIREST_PORT,
/// MEDIREST_DATA_DIR.
pub fn load_rest_api_config() -> Result<RestApiConfig> {
    let host = env::var("MEDIREST_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match env::var("MEDIREST_PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("invalid MEDIREST_PORT value: {raw}"))?,
        Err(_) => DEFAULT_PORT,
    };
    let data_directory = env::var("MEDIREST_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

    Ok(RestApiConfig {
        host,
        port,
        data_directory,
    })
}
