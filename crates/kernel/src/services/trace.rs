//! Traceability recording.
//!
//! Writes one audit record per successful query. Failures are logged and
//! never reach the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::models::{QueryResponse, TraceRecord};
use crate::store::TraceStore;

/// Trace recording service.
#[derive(Clone)]
pub struct TraceRecorder {
    store: Arc<dyn TraceStore>,
    ttl_hours: i64,
}

impl TraceRecorder {
    /// Create a recorder whose records expire `ttl_hours` after the request.
    pub fn new(store: Arc<dyn TraceStore>, ttl_hours: i64) -> Self {
        Self { store, ttl_hours }
    }

    /// Persist the trace of a query answered at `now`.
    ///
    /// Returns the record that was attempted, whether or not the write succeeded.
    pub async fn record(
        &self,
        ip: &str,
        queried_country: &str,
        response: &QueryResponse,
        now: DateTime<Utc>,
    ) -> TraceRecord {
        let record = TraceRecord::new(ip, queried_country, response.clone(), now, self.ttl_hours);

        match self.store.put_trace(&record).await {
            Ok(()) => debug!(id = %record.id, ttl = record.ttl, "trace recorded"),
            Err(e) => error!(id = %record.id, error = %e, "failed to record trace"),
        }

        record
    }
}

impl std::fmt::Debug for TraceRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceRecorder")
            .field("backend", &self.store.backend())
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}
