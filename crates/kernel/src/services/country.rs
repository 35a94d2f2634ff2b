//! Country reference data via a REST Countries–style service.

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::CountryInfo;

#[derive(Debug, Deserialize)]
struct CountryName {
    common: String,
}

#[derive(Debug, Deserialize)]
struct RestCountry {
    name: CountryName,
    #[serde(default)]
    capital: Vec<String>,
    region: String,
    population: u64,
    /// Keyed by ISO 4217 code, in document order.
    #[serde(default)]
    currencies: serde_json::Map<String, Value>,
}

/// Country data resolver.
#[derive(Clone)]
pub struct CountryService {
    client: reqwest::Client,
    base_url: String,
}

impl CountryService {
    /// Create a resolver against `base_url` (e.g. `https://restcountries.com/v3.1`).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Resolve `country` using the first match. `None` on any failure.
    pub async fn resolve(&self, country: &str) -> Option<CountryInfo> {
        match self.fetch(country).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(country = %country, error = %e, "country lookup failed");
                None
            }
        }
    }

    async fn fetch(&self, country: &str) -> Result<CountryInfo> {
        let url = format!(
            "{}/name/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(country)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("country request failed")?;

        if response.status() != StatusCode::OK {
            bail!("country service returned {}", response.status());
        }

        let matches: Vec<Value> = response
            .json()
            .await
            .context("invalid country response")?;

        let first = matches
            .into_iter()
            .next()
            .context("country service returned no matches")?;

        let parsed: RestCountry =
            serde_json::from_value(first).context("unexpected country document")?;

        let capital = parsed
            .capital
            .into_iter()
            .next()
            .context("country has no capital")?;

        let currency = parsed
            .currencies
            .keys()
            .next()
            .cloned()
            .context("country has no currency")?;

        debug!(country = %parsed.name.common, capital = %capital, "country resolved");

        Ok(CountryInfo {
            name: parsed.name.common,
            capital,
            region: parsed.region,
            population: parsed.population,
            currency,
        })
    }
}

impl std::fmt::Debug for CountryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountryService")
            .field("base_url", &self.base_url)
            .finish()
    }
}
