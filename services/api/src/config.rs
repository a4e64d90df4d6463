//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub static_dir: PathBuf,
    pub openai_api_key: Option<String>,
    pub storage_url: String,
    pub storage_service_key: String,
    pub storage_bucket: String,
    pub solver_model: String,
    pub tutor_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./static"));

        // --- Load Object Storage Settings ---
        let storage_url = std::env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_URL".to_string()))?;
        let storage_service_key = std::env::var("SUPABASE_SERVICE_KEY")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_SERVICE_KEY".to_string()))?;
        let storage_bucket =
            std::env::var("SUPABASE_BUCKET").unwrap_or_else(|_| "math-images".to_string());

        // --- Load API Key (as optional; the server binary insists on it) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let solver_model = std::env::var("SOLVER_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let tutor_model =
            std::env::var("TUTOR_MODEL").unwrap_or_else(|_| "gpt-4-turbo".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            static_dir,
            openai_api_key,
            storage_url,
            storage_service_key,
            storage_bucket,
            solver_model,
            tutor_model,
        })
    }
}
