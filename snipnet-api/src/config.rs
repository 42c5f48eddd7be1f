//! API Configuration Module
//!
//! Configuration for the HTTP server and the cache layer behind it,
//! loaded from environment variables with sensible defaults for
//! development.

use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding, CORS, and cache tuning.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host the server binds to.
    pub bind_host: String,

    /// Port the server listens on.
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Per-operation timeout for cache calls. Anything slower reads as a
    /// miss and writes are dropped.
    pub cache_op_timeout: Duration,

    /// TTL for warmed tally snapshots.
    pub tally_ttl: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(), // Empty = allow all
            cache_op_timeout: snipnet_storage::DEFAULT_OP_TIMEOUT,
            tally_ttl: Duration::from_secs(60),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SNIPNET_API_BIND`: Host to bind (default: 0.0.0.0)
    /// - `PORT` / `SNIPNET_API_PORT`: Listen port (default: 8080)
    /// - `SNIPNET_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `SNIPNET_CACHE_OP_TIMEOUT_MS`: Cache operation timeout (default: 250)
    /// - `SNIPNET_TALLY_TTL_SECS`: Warmed tally snapshot TTL (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_host =
            std::env::var("SNIPNET_API_BIND").unwrap_or(defaults.bind_host);

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("SNIPNET_API_PORT").ok())
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let cors_origins = std::env::var("SNIPNET_CORS_ORIGINS")
            .ok()
            .map(|value| parse_origins(&value))
            .unwrap_or_default();

        let cache_op_timeout = std::env::var("SNIPNET_CACHE_OP_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.cache_op_timeout);

        let tally_ttl = std::env::var("SNIPNET_TALLY_TTL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.tally_ttl);

        Self {
            bind_host,
            port,
            cors_origins,
            cache_op_timeout,
            tally_ttl,
        }
    }
}

/// Split a comma-separated origin list, dropping empty segments.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.cache_op_timeout, Duration::from_millis(250));
        assert_eq!(config.tally_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_origins_trims_and_drops_empties() {
        let origins = parse_origins("https://snipnet.app, https://app.snipnet.app ,,");
        assert_eq!(
            origins,
            vec![
                "https://snipnet.app".to_string(),
                "https://app.snipnet.app".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty_string() {
        assert!(parse_origins("").is_empty());
    }
}
