//! In-process trace store.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::TraceStore;
use crate::models::TraceRecord;

/// Trace store backed by a vector; intended for local runs.
///
/// Records whose `ttl` has passed are dropped on the next write, standing in
/// for the TTL sweep of a real store.
#[derive(Default)]
pub struct MemoryTraceStore {
    records: RwLock<Vec<TraceRecord>>,
}

impl MemoryTraceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, oldest first.
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.read().clone()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl TraceStore for MemoryTraceStore {
    async fn put_trace(&self, record: &TraceRecord) -> Result<()> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.ttl > record.timestamp);
        let expired = before - records.len();
        records.push(record.clone());
        debug!(id = %record.id, expired, "trace stored in memory");
        Ok(())
    }

    async fn count_since(&self, ip: &str, since: i64) -> Result<usize> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.ip == ip && r.timestamp > since)
            .count())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryTraceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTraceStore")
            .field("records", &self.len())
            .finish()
    }
}
