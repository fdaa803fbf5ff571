//! Configuration
//!
//! TigerStyle: Explicit defaults, explicit limits, validated once at startup.
//!
//! Values come from CLI flags with environment fallbacks (a `.env` file is
//! loaded first by the binary). `AppConfig::new` is the single validation
//! point.

use std::net::SocketAddr;
use std::time::Duration;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Default HTTP bind address for `serve`
pub const HTTP_BIND_ADDRESS_DEFAULT: &str = "127.0.0.1:3001";

/// Default base URL the client talks to
pub const API_URL_DEFAULT: &str = "http://127.0.0.1:3001";

/// Default overall timeout for one client request
pub const HTTP_TIMEOUT_MS_DEFAULT: u64 = 10_000;

/// Upper bound on the client request timeout
pub const HTTP_TIMEOUT_MS_MAX: u64 = 300_000;

/// Environment variable for the bind address
pub const ENV_BIND: &str = "POSTBOARD_BIND";

/// Environment variable for the API base URL
pub const ENV_API_URL: &str = "POSTBOARD_API_URL";

/// Environment variable for the client timeout
pub const ENV_TIMEOUT_MS: &str = "POSTBOARD_TIMEOUT_MS";

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBind { value: String, reason: String },

    #[error("Invalid API URL '{value}': {reason}")]
    InvalidApiUrl { value: String, reason: String },

    #[error("Timeout must be between 1 and {max} ms, got {value}")]
    InvalidTimeout { value: u64, max: u64 },
}

// =============================================================================
// App Config
// =============================================================================

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address `serve` listens on
    pub bind: SocketAddr,
    /// Base URL of the remote service, without trailing slash
    pub api_url: String,
    /// Overall timeout for one client request
    pub timeout: Duration,
}

impl AppConfig {
    /// Validate raw values into a config.
    pub fn new(bind: &str, api_url: &str, timeout_ms: u64) -> Result<Self, ConfigError> {
        let bind = bind.parse::<SocketAddr>().map_err(|e| ConfigError::InvalidBind {
            value: bind.to_string(),
            reason: e.to_string(),
        })?;

        let url = reqwest::Url::parse(api_url).map_err(|e| ConfigError::InvalidApiUrl {
            value: api_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                value: api_url.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if timeout_ms == 0 || timeout_ms > HTTP_TIMEOUT_MS_MAX {
            return Err(ConfigError::InvalidTimeout {
                value: timeout_ms,
                max: HTTP_TIMEOUT_MS_MAX,
            });
        }

        let config = Self {
            bind,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(timeout_ms),
        };

        // Postcondition
        assert!(!config.timeout.is_zero(), "timeout must be positive");

        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
