//! Call discipline applied to every document store round trip.

use crate::config::StoreConfig;
use crate::domain::ServiceError;
use std::future::Future;
use std::time::Duration;

/// Bounds each store call with a timeout and retries idempotent reads.
///
/// Writes go through [`StoreCall::once`] only. A timed-out write may or may
/// not have landed, so callers re-read state before trying again instead of
/// replaying the write.
#[derive(Debug, Clone, Copy)]
pub struct StoreCall {
    // ---
    timeout: Duration,
    read_retries: u32,
}

impl StoreCall {
    // ---
    pub fn new(timeout: Duration, read_retries: u32) -> Self {
        // ---
        Self {
            timeout,
            read_retries,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        // ---
        Self::new(config.timeout, config.read_retries)
    }

    /// Runs one store call, mapping errors and timeouts to [`ServiceError::Transient`].
    pub async fn once<T, F>(&self, op: &'static str, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        // ---
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::error!("Store call '{}' failed: {:?}", op, err);
                Err(ServiceError::transient(err))
            }
            Err(_) => {
                tracing::error!("Store call '{}' timed out after {:?}", op, self.timeout);
                Err(ServiceError::Transient(format!(
                    "{op} timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }

    /// Runs an idempotent read, retrying transient failures a bounded number of times.
    pub async fn read<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        // ---
        let mut attempt = 0;
        loop {
            match self.once(op, call()).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.read_retries => {
                    attempt += 1;
                    tracing::warn!("Retrying store read '{}' (attempt {}): {}", op, attempt, err);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
