use std::env;
use std::net::SocketAddr;

/// HTTP server settings.
///
/// # Environment Variables
///
/// - `HOST`: bind address (default: `0.0.0.0`)
/// - `PORT`: bind port (default: `3000`)
/// - `LOG_LEVEL`: default tracing filter when `RUST_LOG` is unset (default: `info`)
/// - `LOG_DIR`: directory for rolling log files (default: `storage/logs`)
/// - `OBSERVABILITY_ENABLED`: record metrics and expose `/metrics` (default: enabled)
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_dir: String,
    pub observability_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            observability_enabled: env::var("OBSERVABILITY_ENABLED")
                .map(|v| !v.eq_ignore_ascii_case("false") && v != "0")
                .unwrap_or(defaults.observability_enabled),
        }
    }

    /// Socket address to bind. Falls back to all interfaces when `host` does
    /// not parse.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            log_level: "info".into(),
            log_dir: "storage/logs".into(),
            observability_enabled: true,
        }
    }
}
