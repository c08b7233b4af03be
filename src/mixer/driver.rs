//! Synchronization driver seam between the engine and a live backend.

use async_trait::async_trait;

use super::backend::BackendError;
use super::channel::MixerSnapshot;

/// Converges a stateful audio backend onto a declarative mixer snapshot.
///
/// The engine calls `apply` with the full snapshot after every mixer
/// mutation. Implementations must be idempotent: applying an unchanged
/// snapshot again must not mutate the backend.
#[async_trait]
pub trait MixerDriver: Send + Sync {
    /// Returns the name of this driver for logging.
    fn name(&self) -> &'static str;

    /// Reconcile the backend with `snapshot`.
    async fn apply(&self, snapshot: MixerSnapshot) -> Result<(), BackendError>;
}

/// Driver that accepts every snapshot without touching any backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDriver;

#[async_trait]
impl MixerDriver for NoopDriver {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn apply(&self, _snapshot: MixerSnapshot) -> Result<(), BackendError> {
        Ok(())
    }
}
