//! Caller geolocation via an ipinfo-style HTTP service.
//!
//! Lookups are best effort: any failure yields a record holding only the IP.

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{GeoInfo, Location};

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

/// IP geolocation resolver.
#[derive(Clone)]
pub struct GeolocationService {
    client: reqwest::Client,
    base_url: String,
}

impl GeolocationService {
    /// Create a resolver against `base_url` (e.g. `https://ipinfo.io`).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Locate `ip`. Never fails.
    pub async fn locate(&self, ip: &str) -> GeoInfo {
        match self.fetch(ip).await {
            Ok(geo) => geo,
            Err(e) => {
                warn!(ip = %ip, error = %e, "geolocation lookup failed");
                GeoInfo::degraded(ip)
            }
        }
    }

    async fn fetch(&self, ip: &str) -> Result<GeoInfo> {
        let url = format!(
            "{}/{}/json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(ip)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("geolocation request failed")?;

        if response.status() != StatusCode::OK {
            bail!("geolocation service returned {}", response.status());
        }

        let body: IpInfoResponse = response
            .json()
            .await
            .context("invalid geolocation response")?;

        debug!(ip = %ip, city = ?body.city, "caller located");

        Ok(GeoInfo::located(
            ip,
            Location {
                city: body.city,
                region: body.region,
                country: body.country,
            },
        ))
    }
}

impl std::fmt::Debug for GeolocationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeolocationService")
            .field("base_url", &self.base_url)
            .finish()
    }
}
