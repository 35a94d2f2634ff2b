//! Trace storage backends.
//!
//! The same store serves the audit trail and the rate limiter: every
//! successful query leaves an `(ip, timestamp)` record that later requests
//! count against.

mod dynamodb;
mod memory;

pub use dynamodb::{DynamoTraceStore, to_item};
pub use memory::MemoryTraceStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::TraceRecord;

/// Trace storage backend trait.
#[async_trait]
pub trait TraceStore: Send + Sync {
    /// Persist a trace record. Records are never updated.
    async fn put_trace(&self, record: &TraceRecord) -> Result<()>;

    /// Count records for `ip` with a timestamp strictly greater than `since`.
    async fn count_since(&self, ip: &str, since: i64) -> Result<usize>;

    /// Get the backend name (e.g., "dynamodb", "memory").
    fn backend(&self) -> &'static str;
}
