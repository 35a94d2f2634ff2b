//! Query payloads.
//!
//! Field names on the wire are the ones published by the service
//! (`pais`, `capital`, `temperatura_actual`, ...); Rust names stay English.

use serde::{Deserialize, Serialize};

/// Request body of `POST /`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// Country to look up. `pais` is accepted for older clients.
    #[serde(alias = "pais")]
    pub country: Option<String>,
}

impl QueryRequest {
    /// The trimmed country name, or `None` when absent or blank.
    pub fn country(&self) -> Option<&str> {
        self.country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Country metadata from the reference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(rename = "pais")]
    pub name: String,
    pub capital: String,
    pub region: String,
    #[serde(rename = "poblacion")]
    pub population: u64,
    #[serde(rename = "moneda")]
    pub currency: String,
}

/// Current conditions for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    /// Degrees Celsius.
    #[serde(rename = "temperatura_actual")]
    pub temperature: f64,
    #[serde(rename = "condicion")]
    pub condition: String,
}

/// Best-effort location of the caller.
///
/// A successful lookup always serializes `ciudad`, `region` and `pais`, as
/// `null` when the service did not know them; a failed lookup carries only `ip`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoInfo {
    pub ip: String,
    #[serde(flatten)]
    pub location: Option<Location>,
}

/// Fields reported by the geolocation service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "ciudad")]
    pub city: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "pais")]
    pub country: Option<String>,
}

impl GeoInfo {
    /// Location record carrying only the IP, used when lookup fails.
    pub fn degraded(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            location: None,
        }
    }

    /// Location record from a successful lookup.
    pub fn located(ip: impl Into<String>, location: Location) -> Self {
        Self {
            ip: ip.into(),
            location: Some(location),
        }
    }
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "pais")]
    pub country: String,
    pub capital: String,
    pub region: String,
    #[serde(rename = "poblacion")]
    pub population: u64,
    #[serde(rename = "moneda")]
    pub currency: String,
    #[serde(rename = "temperatura_actual")]
    pub temperature: f64,
    #[serde(rename = "condicion")]
    pub condition: String,
    #[serde(rename = "origen_consulta")]
    pub origin: GeoInfo,
}

impl QueryResponse {
    /// Merge the resolved pieces into one response.
    pub fn compose(country: CountryInfo, weather: WeatherInfo, origin: GeoInfo) -> Self {
        Self {
            country: country.name,
            capital: country.capital,
            region: country.region,
            population: country.population,
            currency: country.currency,
            temperature: weather.temperature,
            condition: weather.condition,
            origin,
        }
    }
}
