//! Current weather via an OpenWeatherMap-style service.

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::WeatherInfo;

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainBlock,
    weather: Vec<ConditionBlock>,
}

/// Weather resolver.
#[derive(Clone)]
pub struct WeatherService {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherService {
    /// Create a resolver against `base_url` (e.g. `https://api.openweathermap.org/data/2.5`).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Current conditions in `city`, in metric units. `None` on any failure.
    pub async fn current(&self, city: &str, api_key: &str) -> Option<WeatherInfo> {
        match self.fetch(city, api_key).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(city = %city, error = %e, "weather lookup failed");
                None
            }
        }
    }

    async fn fetch(&self, city: &str, api_key: &str) -> Result<WeatherInfo> {
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .context("weather request failed")?;

        if response.status() != StatusCode::OK {
            bail!("weather service returned {}", response.status());
        }

        let body: CurrentWeather = response
            .json()
            .await
            .context("invalid weather response")?;

        let condition = body
            .weather
            .into_iter()
            .next()
            .context("weather response has no conditions")?
            .main;

        debug!(city = %city, temperature = body.main.temp, condition = %condition, "weather resolved");

        Ok(WeatherInfo {
            temperature: body.main.temp,
            condition,
        })
    }
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("base_url", &self.base_url)
            .finish()
    }
}
