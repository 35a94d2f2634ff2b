//! Secret lookup backends.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Read-only secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the decrypted value of the named secret.
    async fn get(&self, name: &str) -> Result<String>;
}

/// SSM Parameter Store, read with decryption.
pub struct SsmSecretStore {
    client: aws_sdk_ssm::Client,
}

impl SsmSecretStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SsmSecretStore {
    async fn get(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .with_context(|| format!("failed to read SSM parameter {name}"))?;

        let value = output
            .parameter()
            .and_then(|p| p.value())
            .with_context(|| format!("SSM parameter {name} has no value"))?;

        debug!(name = %name, "secret read from SSM");
        Ok(value.to_string())
    }
}

impl std::fmt::Debug for SsmSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsmSecretStore").finish()
    }
}

/// A single fixed secret, returned for any name.
pub struct StaticSecretStore {
    value: String,
}

impl StaticSecretStore {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get(&self, _name: &str) -> Result<String> {
        Ok(self.value.clone())
    }
}

impl std::fmt::Debug for StaticSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret itself.
        f.debug_struct("StaticSecretStore").finish_non_exhaustive()
    }
}
