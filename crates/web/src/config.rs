//! Registry configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `REGISTRY_HOST` - Bind address (default: 127.0.0.1)
//! - `REGISTRY_PORT` - Listen port (default: 3000)
//! - `REGISTRY_DATA_DIR` - Directory holding the customer store (default: data)
//! - `PAN_LOOKUP_URL` - PAN verification endpoint
//!   (default: <https://lab.pixel6.co/api/verify-pan.php>)
//! - `POSTCODE_LOOKUP_URL` - Postcode details endpoint
//!   (default: <https://lab.pixel6.co/api/get-postcode-details.php>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default PAN verification endpoint.
pub const DEFAULT_PAN_LOOKUP_URL: &str = "https://lab.pixel6.co/api/verify-pan.php";

/// Default postcode details endpoint.
pub const DEFAULT_POSTCODE_LOOKUP_URL: &str = "https://lab.pixel6.co/api/get-postcode-details.php";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Registry application configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory the JSON store writes into
    pub data_dir: PathBuf,
    /// Remote lookup endpoints
    pub lookup: LookupConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Remote lookup endpoints.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// PAN verification endpoint
    pub pan_url: Url,
    /// Postcode details endpoint
    pub postcode_url: Url,
}

impl RegistryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("REGISTRY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("REGISTRY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("REGISTRY_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("REGISTRY_PORT".to_string(), e.to_string()))?;
        let data_dir = PathBuf::from(get_env_or_default("REGISTRY_DATA_DIR", "data"));

        Ok(Self {
            host,
            port,
            data_dir,
            lookup: LookupConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl LookupConfig {
    /// Load the lookup endpoints from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either URL fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pan_url: get_url("PAN_LOOKUP_URL", DEFAULT_PAN_LOOKUP_URL)?,
            postcode_url: get_url("POSTCODE_LOOKUP_URL", DEFAULT_POSTCODE_LOOKUP_URL)?,
        })
    }
}

impl Default for LookupConfig {
    #[allow(clippy::unwrap_used)] // compile-time constants
    fn default() -> Self {
        Self {
            pan_url: Url::parse(DEFAULT_PAN_LOOKUP_URL).unwrap(),
            postcode_url: Url::parse(DEFAULT_POSTCODE_LOOKUP_URL).unwrap(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a URL from the environment, falling back to `default`.
fn get_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    parse_url(key, &get_env_or_default(key, default))
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}
