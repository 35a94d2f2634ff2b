//! DynamoDB trace store.
//!
//! Items are keyed by `id`; the rate limiter reads through a global secondary
//! index on (`ip`, `timestamp`). The table's TTL attribute is `ttl`.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use serde_json::Value;
use tracing::debug;

use super::TraceStore;
use crate::models::TraceRecord;

/// Trace store backed by a DynamoDB table.
pub struct DynamoTraceStore {
    client: Client,
    table: String,
    ip_index: String,
}

impl DynamoTraceStore {
    /// Create a store over `table`, counting requests through `ip_index`.
    pub fn new(client: Client, table: impl Into<String>, ip_index: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            ip_index: ip_index.into(),
        }
    }
}

#[async_trait]
impl TraceStore for DynamoTraceStore {
    async fn put_trace(&self, record: &TraceRecord) -> Result<()> {
        let item = to_item(record)?;

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .send()
            .await
            .context("failed to put trace item")?;

        debug!(table = %self.table, id = %record.id, "trace written to DynamoDB");
        Ok(())
    }

    async fn count_since(&self, ip: &str, since: i64) -> Result<usize> {
        let mut total = 0usize;
        let mut start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table)
                .index_name(&self.ip_index)
                .key_condition_expression("#ip = :ip AND #ts > :since")
                .expression_attribute_names("#ip", "ip")
                .expression_attribute_names("#ts", "timestamp")
                .expression_attribute_values(":ip", AttributeValue::S(ip.to_string()))
                .expression_attribute_values(":since", AttributeValue::N(since.to_string()))
                .select(Select::Count)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .context("failed to query trace index")?;

            total += usize::try_from(output.count()).unwrap_or_default();

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(total)
    }

    fn backend(&self) -> &'static str {
        "dynamodb"
    }
}

impl std::fmt::Debug for DynamoTraceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoTraceStore")
            .field("table", &self.table)
            .field("ip_index", &self.ip_index)
            .finish()
    }
}

/// Convert a trace record into a DynamoDB item.
///
/// Numbers are written as their exact decimal text so floats stored in the
/// audit trail read back as the same value the caller was sent.
pub fn to_item(record: &TraceRecord) -> Result<HashMap<String, AttributeValue>> {
    let value = serde_json::to_value(record).context("failed to serialize trace record")?;
    match to_attribute_value(value) {
        AttributeValue::M(item) => Ok(item),
        _ => bail!("trace record did not serialize to an object"),
    }
}

fn to_attribute_value(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(items) => {
            AttributeValue::L(items.into_iter().map(to_attribute_value).collect())
        }
        Value::Object(map) => AttributeValue::M(
            map.into_iter()
                .map(|(k, v)| (k, to_attribute_value(v)))
                .collect(),
        ),
    }
}
