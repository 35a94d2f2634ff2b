//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Default SSM parameter holding the OpenWeatherMap API key.
pub const DEFAULT_WEATHER_KEY_PARAM: &str = "/weather-info/openweathermap-api-key";

/// Longest accepted trace lifetime (ten years).
pub const MAX_TTL_HOURS: i64 = 24 * 365 * 10;

/// Where trace records (and rate limit lookups) live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceBackend {
    /// DynamoDB table with an `(ip, timestamp)` secondary index.
    DynamoDb,
    /// In-process store; lost on restart.
    Memory,
}

impl TraceBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "dynamodb" => Ok(Self::DynamoDb),
            "memory" => Ok(Self::Memory),
            other => bail!("TRACE_BACKEND must be 'dynamodb' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// AWS region for SSM and DynamoDB.
    pub region: Option<String>,

    /// Optional AWS credential profile.
    pub profile_name: Option<String>,

    /// Trace store backend (default: dynamodb).
    pub trace_backend: TraceBackend,

    /// DynamoDB table holding trace records.
    pub dynamodb_table: Option<String>,

    /// Hours a trace record lives before the store expires it (default: 24).
    pub ttl_hours: i64,

    /// Secondary index queried by the rate limiter.
    pub rate_limit_index: String,

    /// Requests allowed per IP inside the window (default: 5).
    pub rate_limit_max_requests: u32,

    /// Trailing rate limit window (default: 60s).
    pub rate_limit_window: Duration,

    /// SSM parameter name of the weather API key.
    pub weather_key_param: String,

    /// Static weather API key. When set, SSM is not consulted.
    pub weather_api_key: Option<String>,

    /// Base URL of the IP geolocation service.
    pub geolocation_url: String,

    /// Base URL of the country reference service.
    pub countries_url: String,

    /// Base URL of the weather service.
    pub weather_url: String,

    /// Optional timeout for outbound HTTP calls. None keeps client defaults.
    pub http_timeout: Option<Duration>,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Take the caller IP from `X-Forwarded-For`/`X-Real-IP` (default: false).
    /// Only enable behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            region: None,
            profile_name: None,
            trace_backend: TraceBackend::DynamoDb,
            dynamodb_table: None,
            ttl_hours: 24,
            rate_limit_index: "ip-timestamp-index".to_string(),
            rate_limit_max_requests: 5,
            rate_limit_window: Duration::from_secs(60),
            weather_key_param: DEFAULT_WEATHER_KEY_PARAM.to_string(),
            weather_api_key: None,
            geolocation_url: "https://ipinfo.io".to_string(),
            countries_url: "https://restcountries.com/v3.1".to_string(),
            weather_url: "https://api.openweathermap.org/data/2.5".to_string(),
            http_timeout: None,
            cors_allowed_origins: vec!["*".to_string()],
            trust_proxy_headers: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = env::var("PORT")
            .unwrap_or_else(|_| defaults.port.to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let region = env::var("REGION").ok().filter(|s| !s.is_empty());
        let profile_name = env::var("PROFILE_NAME").ok().filter(|s| !s.is_empty());

        let trace_backend = match env::var("TRACE_BACKEND") {
            Ok(v) => TraceBackend::parse(&v)?,
            Err(_) => defaults.trace_backend,
        };

        let dynamodb_table = env::var("DYNAMODB_TABLE").ok().filter(|s| !s.is_empty());

        let ttl_hours = env::var("DYNAMODB_TTL_HOURS")
            .unwrap_or_else(|_| defaults.ttl_hours.to_string())
            .parse()
            .context("DYNAMODB_TTL_HOURS must be a valid integer")?;

        let rate_limit_index =
            env::var("RATE_LIMIT_INDEX").unwrap_or(defaults.rate_limit_index);

        let rate_limit_max_requests = env::var("RATE_LIMIT_MAX_REQUESTS")
            .unwrap_or_else(|_| defaults.rate_limit_max_requests.to_string())
            .parse()
            .context("RATE_LIMIT_MAX_REQUESTS must be a valid u32")?;

        let rate_limit_window = env::var("RATE_LIMIT_WINDOW_SECS")
            .map(|v| v.parse().map(Duration::from_secs))
            .unwrap_or(Ok(defaults.rate_limit_window))
            .context("RATE_LIMIT_WINDOW_SECS must be a valid u64")?;

        let weather_key_param =
            env::var("WEATHER_API_KEY_PARAM").unwrap_or(defaults.weather_key_param);
        let weather_api_key = env::var("WEATHER_API_KEY").ok().filter(|s| !s.is_empty());

        let geolocation_url = env::var("GEOLOCATION_URL").unwrap_or(defaults.geolocation_url);
        let countries_url = env::var("COUNTRIES_URL").unwrap_or(defaults.countries_url);
        let weather_url = env::var("WEATHER_URL").unwrap_or(defaults.weather_url);

        let http_timeout = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse().map(Duration::from_secs))
            .transpose()
            .context("HTTP_TIMEOUT_SECS must be a valid u64")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or(defaults.cors_allowed_origins);

        let trust_proxy_headers = env::var("TRUST_PROXY_HEADERS")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.trust_proxy_headers);

        let config = Self {
            port,
            region,
            profile_name,
            trace_backend,
            dynamodb_table,
            ttl_hours,
            rate_limit_index,
            rate_limit_max_requests,
            rate_limit_window,
            weather_key_param,
            weather_api_key,
            geolocation_url,
            countries_url,
            weather_url,
            http_timeout,
            cors_allowed_origins,
            trust_proxy_headers,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the AWS settings required by the chosen backends are present.
    pub fn validate(&self) -> Result<()> {
        let needs_aws =
            self.trace_backend == TraceBackend::DynamoDb || self.weather_api_key.is_none();
        if needs_aws && self.region.is_none() {
            bail!("REGION environment variable is required for AWS-backed stores");
        }
        if self.trace_backend == TraceBackend::DynamoDb && self.dynamodb_table.is_none() {
            bail!("DYNAMODB_TABLE environment variable is required for the dynamodb backend");
        }
        if !(0..=MAX_TTL_HOURS).contains(&self.ttl_hours) {
            bail!("DYNAMODB_TTL_HOURS must be between 0 and {MAX_TTL_HOURS}");
        }
        Ok(())
    }
}
