//! Country Weather Kernel Library
//!
//! Answers "what is the weather in the capital of this country" by chaining
//! an IP geolocation lookup, a country reference lookup and a weather lookup,
//! with per-IP rate limiting and an expiring audit trail.
//!
//! The main entry point for running the server is the `country-weather` binary.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod secrets;
pub mod services;
pub mod state;
pub mod store;

pub use config::Config;
pub use routes::app;
pub use state::AppState;
