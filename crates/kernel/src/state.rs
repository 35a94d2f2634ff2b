//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

use crate::config::{Config, TraceBackend};
use crate::middleware::{RateLimitConfig, RateLimiter};
use crate::secrets::{SecretStore, SsmSecretStore, StaticSecretStore};
use crate::services::{CountryService, GeolocationService, TraceRecorder, WeatherService};
use crate::store::{DynamoTraceStore, MemoryTraceStore, TraceStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap. Everything inside is created
/// once at startup and never mutated by request handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Store behind both the rate limiter and the trace recorder.
    trace_store: Arc<dyn TraceStore>,

    /// Source of the weather API key.
    secrets: Arc<dyn SecretStore>,

    rate_limiter: RateLimiter,
    geolocation: GeolocationService,
    countries: CountryService,
    weather: WeatherService,
    traces: TraceRecorder,
}

impl AppState {
    /// Create application state, connecting the configured backends.
    pub async fn new(config: &Config) -> Result<Self> {
        let needs_aws =
            config.trace_backend == TraceBackend::DynamoDb || config.weather_api_key.is_none();
        let sdk_config = if needs_aws {
            Some(load_aws_config(config).await)
        } else {
            None
        };

        let trace_store: Arc<dyn TraceStore> = match (config.trace_backend, &sdk_config) {
            (TraceBackend::DynamoDb, Some(sdk)) => {
                let table = config
                    .dynamodb_table
                    .clone()
                    .context("DYNAMODB_TABLE is required for the dynamodb backend")?;
                Arc::new(DynamoTraceStore::new(
                    aws_sdk_dynamodb::Client::new(sdk),
                    table,
                    config.rate_limit_index.clone(),
                ))
            }
            _ => Arc::new(MemoryTraceStore::new()),
        };

        let secrets: Arc<dyn SecretStore> = match (&config.weather_api_key, &sdk_config) {
            (Some(key), _) => Arc::new(StaticSecretStore::new(key.clone())),
            (None, Some(sdk)) => Arc::new(SsmSecretStore::new(aws_sdk_ssm::Client::new(sdk))),
            (None, None) => anyhow::bail!("no weather API key source configured"),
        };

        info!(
            trace_backend = trace_store.backend(),
            static_key = config.weather_api_key.is_some(),
            "backends initialized"
        );

        Self::with_backends(config.clone(), trace_store, secrets)
    }

    /// Create application state over explicit backends.
    pub fn with_backends(
        config: Config,
        trace_store: Arc<dyn TraceStore>,
        secrets: Arc<dyn SecretStore>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;

        let rate_limiter = RateLimiter::new(
            trace_store.clone(),
            RateLimitConfig {
                max_requests: config.rate_limit_max_requests,
                window: config.rate_limit_window,
            },
        );
        let geolocation = GeolocationService::new(http.clone(), config.geolocation_url.clone());
        let countries = CountryService::new(http.clone(), config.countries_url.clone());
        let weather = WeatherService::new(http, config.weather_url.clone());
        let traces = TraceRecorder::new(trace_store.clone(), config.ttl_hours);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                trace_store,
                secrets,
                rate_limiter,
                geolocation,
                countries,
                weather,
                traces,
            }),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the trace store.
    pub fn trace_store(&self) -> &Arc<dyn TraceStore> {
        &self.inner.trace_store
    }

    /// Get the secret store.
    pub fn secrets(&self) -> &Arc<dyn SecretStore> {
        &self.inner.secrets
    }

    /// Get the rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    /// Get the geolocation resolver.
    pub fn geolocation(&self) -> &GeolocationService {
        &self.inner.geolocation
    }

    /// Get the country data resolver.
    pub fn countries(&self) -> &CountryService {
        &self.inner.countries
    }

    /// Get the weather resolver.
    pub fn weather(&self) -> &WeatherService {
        &self.inner.weather
    }

    /// Get the trace recorder.
    pub fn traces(&self) -> &TraceRecorder {
        &self.inner.traces
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("trace_backend", &self.inner.trace_store.backend())
            .field("rate_limiter", &self.inner.rate_limiter)
            .finish_non_exhaustive()
    }
}

async fn load_aws_config(config: &Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &config.profile_name {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}
