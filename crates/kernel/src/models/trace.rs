//! Trace (audit) record of one completed query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QueryResponse;

/// Write-once audit entry. Expires from the store at `ttl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// `{ip}-{timestamp}`.
    pub id: String,
    pub ip: String,
    /// Request time in epoch seconds.
    pub timestamp: i64,
    #[serde(rename = "pais_consultado")]
    pub queried_country: String,
    #[serde(rename = "respuesta")]
    pub response: QueryResponse,
    /// Expiry in epoch seconds.
    pub ttl: i64,
}

impl TraceRecord {
    /// Build the record for a query answered at `now`.
    pub fn new(
        ip: &str,
        queried_country: &str,
        response: QueryResponse,
        now: DateTime<Utc>,
        ttl_hours: i64,
    ) -> Self {
        let timestamp = now.timestamp();
        Self {
            id: format!("{ip}-{timestamp}"),
            ip: ip.to_string(),
            timestamp,
            queried_country: queried_country.to_string(),
            response,
            ttl: timestamp.saturating_add(ttl_hours.saturating_mul(3600)),
        }
    }
}
