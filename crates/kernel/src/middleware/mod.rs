//! HTTP request processing helpers.
//!
//! Provides per-IP rate limiting and client identification.

pub mod rate_limit;

pub use rate_limit::{RateLimitConfig, RateLimiter, get_client_id};
