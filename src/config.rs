//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Directory where uploaded files are staged before ingestion
    pub uploads_dir: PathBuf,

    /// Path of the persisted whole-file hash set
    pub file_hashes_path: PathBuf,

    /// Path of the persisted line hash set
    pub line_hashes_path: PathBuf,

    /// Whether batch hashes are merged and persisted after ingestion
    pub duplicity_check: bool,

    /// Whether processed aggregates are saved to the document table
    pub save_data: bool,

    /// Whether staged files are deleted after processing
    pub delete_files: bool,

    /// Maximum concurrent stream subscribers
    pub max_stream_subscribers: usize,

    /// Upload body size limit in bytes
    pub file_size_limit: usize,

    /// Maximum files per upload request
    pub files_limit: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let uploads_dir =
            PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "/tmp/uploads".to_string()));

        let file_hashes_path = PathBuf::from(
            env::var("STORAGE_FILE_HASHES").unwrap_or_else(|_| "/tmp/fileHashes.json".to_string()),
        );

        let line_hashes_path = PathBuf::from(
            env::var("STORAGE_LINE_HASHES").unwrap_or_else(|_| "/tmp/lineHashes.json".to_string()),
        );

        let duplicity_check = env_bool("DUPLICITY_CHECK", true)?;
        let save_data = env_bool("SAVE_DATA", true)?;
        let delete_files = env_bool("DELETE_FILES", true)?;

        let max_stream_subscribers = env::var("MAX_STREAM_SUBSCRIBERS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_STREAM_SUBSCRIBERS"))?;

        let file_size_limit = env::var("FILE_SIZE_LIMIT")
            .unwrap_or_else(|_| (100 * 1024 * 1024).to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("FILE_SIZE_LIMIT"))?;

        let files_limit = env::var("FILES_LIMIT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("FILES_LIMIT"))?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            uploads_dir,
            file_hashes_path,
            line_hashes_path,
            duplicity_check,
            save_data,
            delete_files,
            max_stream_subscribers,
            file_size_limit,
            files_limit,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn env_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
