#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Builds the REAL router and state over an in-memory trace store and a
//! static secret, with the three upstream services replaced by wiremock
//! servers.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use country_weather_kernel::config::TraceBackend;
use country_weather_kernel::models::TraceRecord;
use country_weather_kernel::secrets::{SecretStore, StaticSecretStore};
use country_weather_kernel::store::{MemoryTraceStore, TraceStore};
use country_weather_kernel::{AppState, Config, app};

pub const API_KEY: &str = "test-weather-key";

/// Trace store that records write attempts and rejects every write.
#[derive(Default)]
pub struct RejectingTraceStore {
    pub attempts: AtomicUsize,
}

impl RejectingTraceStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TraceStore for RejectingTraceStore {
    async fn put_trace(&self, _record: &TraceRecord) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("conditional check failed")
    }

    async fn count_since(&self, _ip: &str, _since: i64) -> anyhow::Result<usize> {
        Ok(0)
    }

    fn backend(&self) -> &'static str {
        "rejecting"
    }
}

/// Secret store that is always unreachable.
pub struct UnreachableSecretStore;

#[async_trait]
impl SecretStore for UnreachableSecretStore {
    async fn get(&self, name: &str) -> anyhow::Result<String> {
        anyhow::bail!("parameter {name} not found")
    }
}

/// Mock upstream services.
pub struct Upstreams {
    pub geo: MockServer,
    pub countries: MockServer,
    pub weather: MockServer,
}

impl Upstreams {
    pub async fn start() -> Self {
        Self {
            geo: MockServer::start().await,
            countries: MockServer::start().await,
            weather: MockServer::start().await,
        }
    }

    /// Configuration pointing every resolver at the mock servers, behind a
    /// trusted proxy so tests can pick the caller IP with `X-Forwarded-For`.
    pub fn config(&self) -> Config {
        Config {
            trust_proxy_headers: true,
            ..self.direct_config()
        }
    }

    /// Configuration for a server exposed without a proxy in front.
    pub fn direct_config(&self) -> Config {
        Config {
            trace_backend: TraceBackend::Memory,
            weather_api_key: Some(API_KEY.to_string()),
            geolocation_url: self.geo.uri(),
            countries_url: self.countries.uri(),
            weather_url: self.weather.uri(),
            ..Config::default()
        }
    }
}

/// Test application wrapper using the REAL routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// App over a fresh memory store.
    pub fn new(upstreams: &Upstreams) -> (Self, Arc<MemoryTraceStore>) {
        let store = Arc::new(MemoryTraceStore::new());
        let app = Self::with_backends(
            upstreams,
            store.clone(),
            Arc::new(StaticSecretStore::new(API_KEY)),
        );
        (app, store)
    }

    /// App over a fresh memory store with explicit configuration.
    pub fn with_config(config: Config) -> (Self, Arc<MemoryTraceStore>) {
        let store = Arc::new(MemoryTraceStore::new());
        let app = Self::build(config, store.clone(), Arc::new(StaticSecretStore::new(API_KEY)));
        (app, store)
    }

    /// App over explicit backends.
    pub fn with_backends(
        upstreams: &Upstreams,
        store: Arc<dyn TraceStore>,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        Self::build(upstreams.config(), store, secrets)
    }

    fn build(config: Config, store: Arc<dyn TraceStore>, secrets: Arc<dyn SecretStore>) -> Self {
        let state =
            AppState::with_backends(config, store, secrets).expect("failed to build state");
        Self {
            router: app(state.clone()),
            state,
        }
    }

    /// Send a request from `ip` and decode the JSON response.
    pub async fn send(&self, method: Method, ip: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(body.to_string()))
            .unwrap();

        self.request(request).await
    }

    /// POST a query from `ip`.
    pub async fn post(&self, ip: &str, body: &str) -> (StatusCode, Value) {
        self.send(Method::POST, ip, body).await
    }

    /// POST a query over a connection from `peer` carrying a forwarding header.
    pub async fn post_from_peer(
        &self,
        peer: SocketAddr,
        forwarded_for: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::from(body.to_string()))
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        self.request(request).await
    }

    /// Run an arbitrary request and decode the JSON response.
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        assert_eq!(
            content_type.as_deref(),
            Some("application/json"),
            "response must be JSON"
        );
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
