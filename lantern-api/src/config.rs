//! API Configuration Module
//!
//! Loaded from environment variables with development defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host or IP the listener binds to.
    pub bind: String,

    pub port: u16,

    /// Directory holding `count.txt` and `step.txt`.
    pub counter_dir: PathBuf,

    /// Allowed CORS origins. Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            counter_dir: PathBuf::from("."),
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// - `LANTERN_API_BIND`: listen address (default: 0.0.0.0)
    /// - `PORT` or `LANTERN_API_PORT`: listen port (default: 3000)
    /// - `LANTERN_COUNTER_DIR`: counter file directory (default: .)
    /// - `LANTERN_CORS_ORIGINS`: comma-separated allowed origins (empty = allow all)
    /// - `LANTERN_CORS_MAX_AGE_SECS`: preflight cache duration (default: 86400)
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ApiConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let defaults = Self::default();

        let bind = lookup("LANTERN_API_BIND").unwrap_or(defaults.bind);

        let port = match lookup("PORT").or_else(|| lookup("LANTERN_API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => defaults.port,
        };

        let counter_dir = lookup("LANTERN_COUNTER_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.counter_dir);

        let cors_origins = lookup("LANTERN_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = lookup("LANTERN_CORS_MAX_AGE_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        Ok(Self {
            bind,
            port,
            counter_dir,
            cors_origins,
            cors_max_age_secs,
        })
    }

    pub fn socket_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.counter_dir, PathBuf::from("."));
        assert!(!config.is_production());
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_port_prefers_platform_variable() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("LANTERN_API_PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);

        let config = ApiConfig::from_lookup(lookup_from(&[("LANTERN_API_PORT", "9090")])).unwrap();
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = ApiConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.message.contains("eighty"));
    }

    #[test]
    fn test_cors_origins_parsed() {
        let config = ApiConfig::from_lookup(lookup_from(&[(
            "LANTERN_CORS_ORIGINS",
            "https://dash.example, ,http://localhost:5173",
        )]))
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://dash.example", "http://localhost:5173"]
        );
        assert!(config.is_production());
    }

    #[test]
    fn test_bad_bind_address() {
        let config = ApiConfig::from_lookup(lookup_from(&[("LANTERN_API_BIND", "not a host")]))
            .unwrap();
        assert!(config.socket_addr().is_err());
    }
}
