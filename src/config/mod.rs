//! Configuration management
//!
//! This module handles loading and parsing configuration for the Pencraft
//! blog backend. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults. Provider
//! credentials (identity / object storage) are deliberately optional at
//! startup: their absence is reported per request as a 500 diagnostic rather
//! than crashing the process.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// External provider configuration (identity + object storage)
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/pencraft.db".to_string()
}

/// External provider configuration.
///
/// Points at a combined identity/object-storage service (GoTrue-style auth
/// endpoints under `/auth/v1`, bucket storage under `/storage/v1`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider (e.g. https://xyz.example.co)
    #[serde(default)]
    pub url: Option<String>,
    /// Anonymous API key, sent with auth requests
    #[serde(default)]
    pub anon_key: Option<String>,
    /// Service-role key for storage writes; falls back to anon_key when unset
    #[serde(default)]
    pub service_role_key: Option<String>,
    /// Storage bucket for uploaded images and avatars
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

fn default_bucket() -> String {
    "pencraft-media".to_string()
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum post image size in bytes (default: 10MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Maximum avatar size in bytes (default: 5MB)
    #[serde(default = "default_max_avatar_size")]
    pub max_avatar_size: u64,
    /// Allowed avatar MIME types
    #[serde(default = "default_avatar_types")]
    pub allowed_avatar_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_avatar_size: default_max_avatar_size(),
            allowed_avatar_types: default_avatar_types(),
        }
    }
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_max_avatar_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_avatar_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/jpg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is allowed for avatars
    pub fn is_avatar_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_avatar_types.iter().any(|t| t == mime_type)
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file.
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Environment variables follow the pattern:
    /// - PENCRAFT_SERVER_HOST
    /// - PENCRAFT_SERVER_PORT
    /// - PENCRAFT_SERVER_CORS_ORIGIN
    /// - PENCRAFT_DATABASE_URL
    /// - PENCRAFT_PROVIDER_URL
    /// - PENCRAFT_PROVIDER_ANON_KEY
    /// - PENCRAFT_PROVIDER_SERVICE_ROLE_KEY
    /// - PENCRAFT_PROVIDER_BUCKET
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PENCRAFT_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PENCRAFT_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("PENCRAFT_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("PENCRAFT_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(url) = std::env::var("PENCRAFT_PROVIDER_URL") {
            self.provider.url = Some(url);
        }
        if let Ok(key) = std::env::var("PENCRAFT_PROVIDER_ANON_KEY") {
            self.provider.anon_key = Some(key);
        }
        if let Ok(key) = std::env::var("PENCRAFT_PROVIDER_SERVICE_ROLE_KEY") {
            self.provider.service_role_key = Some(key);
        }
        if let Ok(bucket) = std::env::var("PENCRAFT_PROVIDER_BUCKET") {
            self.provider.bucket = bucket;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.database.url, "data/pencraft.db");
        assert!(config.provider.url.is_none());
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.upload.max_avatar_size, 5 * 1024 * 1024);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9000").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.provider.bucket, "pencraft-media");
    }

    #[test]
    fn test_load_invalid_yaml_reports_location() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server: [unclosed").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = lock_env();
        std::env::set_var("PENCRAFT_SERVER_PORT", "4000");
        std::env::set_var("PENCRAFT_DATABASE_URL", ":memory:");
        std::env::set_var("PENCRAFT_PROVIDER_URL", "https://id.example.com");

        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load_with_env(path).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(
            config.provider.url.as_deref(),
            Some("https://id.example.com")
        );

        std::env::remove_var("PENCRAFT_SERVER_PORT");
        std::env::remove_var("PENCRAFT_DATABASE_URL");
        std::env::remove_var("PENCRAFT_PROVIDER_URL");
    }

    #[test]
    fn test_env_invalid_port_ignored() {
        let _guard = lock_env();
        std::env::set_var("PENCRAFT_SERVER_PORT", "not-a-port");

        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load_with_env(path).unwrap();
        assert_eq!(config.server.port, 3001);

        std::env::remove_var("PENCRAFT_SERVER_PORT");
    }

    #[test]
    fn test_avatar_type_allowed() {
        let config = UploadConfig::default();
        assert!(config.is_avatar_type_allowed("image/png"));
        assert!(config.is_avatar_type_allowed("image/webp"));
        assert!(!config.is_avatar_type_allowed("image/svg+xml"));
        assert!(!config.is_avatar_type_allowed("application/pdf"));
    }
}
