//! Per-IP rate limiting against the trace store.
//!
//! Counts the caller's trace records inside a trailing window. Lookups that
//! fail let the request through (fail open).

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::store::TraceStore;

/// Rate limit configuration.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests allowed inside the window.
    pub max_requests: u32,
    /// Trailing window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

/// Rate limiter reading request history from a trace store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn TraceStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter.
    pub fn new(store: Arc<dyn TraceStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Check if a request from `ip` at epoch second `now` should be limited.
    ///
    /// Returns Ok(()) if allowed, Err with retry-after seconds if limited.
    pub async fn check(&self, ip: &str, now: i64) -> Result<(), u64> {
        let window_secs = self.config.window.as_secs();
        let since = now - i64::try_from(window_secs).unwrap_or(i64::MAX);

        let count = match self.store.count_since(ip, since).await {
            Ok(c) => c,
            Err(e) => {
                warn!(ip = %ip, error = %e, "rate limit check failed, allowing request");
                return Ok(());
            }
        };

        if count >= self.config.max_requests as usize {
            debug!(
                ip = %ip,
                count = count,
                limit = self.config.max_requests,
                "rate limit exceeded"
            );
            Err(window_secs)
        } else {
            Ok(())
        }
    }
}

/// Get the client identifier (IP address) for rate limiting.
///
/// Forwarding headers are client-controlled, so they are only read when
/// `trust_proxy_headers` is set; otherwise the peer address is used.
pub fn get_client_id(
    addr: Option<std::net::SocketAddr>,
    headers: &axum::http::HeaderMap,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        // Check X-Forwarded-For header first (for proxied requests)
        if let Some(forwarded) = headers.get("x-forwarded-for")
            && let Ok(value) = forwarded.to_str()
            && let Some(ip) = value.split(',').next().map(str::trim)
            && !ip.is_empty()
        {
            return ip.to_string();
        }

        if let Some(real_ip) = headers.get("x-real-ip")
            && let Ok(value) = real_ip.to_str()
            && !value.trim().is_empty()
        {
            return value.trim().to_string();
        }
    }

    // Fall back to connection address
    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("backend", &self.store.backend())
            .field("config", &self.config)
            .finish()
    }
}
