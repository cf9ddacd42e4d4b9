//! Gateway configuration with validation.

use super::error::GatewayError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Listen address
    pub host: IpAddr,
    /// Listen port
    pub port: u16,
    /// Per-route rate limiting
    pub rate_limit: RateLimitConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Render table keys as `"..." + address[20..]`
    pub mask_addresses: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 80,
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            mask_addresses: false,
        }
    }
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.rate_limit.enabled {
            if self.rate_limit.requests_per_window == 0 {
                return Err(GatewayError::Config(
                    "requests_per_window cannot be 0".into(),
                ));
            }
            if self.rate_limit.window.is_zero() {
                return Err(GatewayError::Config("rate limit window cannot be 0".into()));
            }
        }
        Ok(())
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Rate limiting configuration. Each route has its own budget per client IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per client inside one window
    pub requests_per_window: u32,
    /// Window length
    pub window: Duration,
    /// Enable rate limiting
    pub enabled: bool,
    /// Key clients by `X-Forwarded-For`/`X-Real-IP` instead of the socket peer.
    /// Only safe behind a proxy that overwrites these headers.
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 5,
            window: Duration::from_secs(1),
            enabled: true,
            trust_forwarded_headers: false,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// `"*"` allows any origin
    pub allowed_origins: Vec<String>,
    /// Preflight cache lifetime in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}
