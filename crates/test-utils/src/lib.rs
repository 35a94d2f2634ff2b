//! Country weather test utilities.
//!
//! Builders for upstream payloads shaped like the real services
//! (REST Countries v3.1, OpenWeatherMap 2.5, ipinfo.io) so integration tests
//! can mount them on mock servers.

use serde_json::{Value as JsonValue, json};

/// Create a REST Countries match with default values.
pub fn test_country(name: &str, capital: &str) -> TestCountry {
    TestCountry {
        name: name.to_string(),
        capital: Some(capital.to_string()),
        region: "Europe".to_string(),
        population: 1_000_000,
        currencies: vec!["EUR".to_string()],
    }
}

/// A country builder for REST Countries fixtures.
#[derive(Debug, Clone)]
pub struct TestCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: String,
    pub population: u64,
    pub currencies: Vec<String>,
}

impl TestCountry {
    /// Set the region.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    /// Set the population.
    pub fn with_population(mut self, population: u64) -> Self {
        self.population = population;
        self
    }

    /// Replace the currency codes, in listing order.
    pub fn with_currencies(mut self, codes: &[&str]) -> Self {
        self.currencies = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Drop the capital.
    pub fn without_capital(mut self) -> Self {
        self.capital = None;
        self
    }

    /// One element of the `/name/{name}` response array.
    pub fn to_json(&self) -> JsonValue {
        let currencies: serde_json::Map<String, JsonValue> = self
            .currencies
            .iter()
            .map(|code| (code.clone(), json!({"name": code, "symbol": ""})))
            .collect();

        let mut doc = json!({
            "name": {"common": self.name, "official": self.name},
            "region": self.region,
            "population": self.population,
            "currencies": currencies,
        });
        if let Some(capital) = &self.capital {
            doc["capital"] = json!([capital]);
        }
        doc
    }

    /// Full response body: an array holding this match.
    pub fn response_body(&self) -> JsonValue {
        json!([self.to_json()])
    }
}

/// REST Countries "not found" body.
pub fn country_not_found() -> JsonValue {
    json!({"status": 404, "message": "Not Found"})
}

/// OpenWeatherMap current weather body.
pub fn weather_body(temperature: f64, condition: &str) -> JsonValue {
    json!({
        "coord": {"lon": 0.0, "lat": 0.0},
        "weather": [{"id": 800, "main": condition, "description": condition.to_lowercase()}],
        "main": {"temp": temperature, "feels_like": temperature, "humidity": 50},
        "name": "Test City",
        "cod": 200
    })
}

/// OpenWeatherMap "city not found" body.
pub fn weather_not_found() -> JsonValue {
    json!({"cod": "404", "message": "city not found"})
}

/// ipinfo.io body for `ip`.
pub fn geo_body(ip: &str, city: &str, region: &str, country: &str) -> JsonValue {
    json!({
        "ip": ip,
        "city": city,
        "region": region,
        "country": country,
        "loc": "0.0,0.0",
        "timezone": "UTC"
    })
}
