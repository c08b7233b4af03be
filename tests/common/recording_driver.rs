//! Mixer driver that records snapshots and can be told to fail.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scene_engine::mixer::{BackendError, MixerDriver, MixerSnapshot};

#[derive(Clone, Default)]
pub struct RecordingDriver {
    snapshots: Arc<Mutex<Vec<MixerSnapshot>>>,
    fail: Arc<Mutex<bool>>,
    delays: Arc<Mutex<HashMap<u64, Duration>>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following apply fail with `BackendError::Closed`.
    pub fn fail_next_applies(&self) {
        *self.fail.lock() = true;
    }

    /// Hold the apply of `revision` for `delay` before recording it.
    pub fn delay_revision(&self, revision: u64, delay: Duration) {
        self.delays.lock().insert(revision, delay);
    }

    pub fn snapshots(&self) -> Vec<MixerSnapshot> {
        self.snapshots.lock().clone()
    }

    pub fn last(&self) -> Option<MixerSnapshot> {
        self.snapshots.lock().last().cloned()
    }
}

#[async_trait]
impl MixerDriver for RecordingDriver {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn apply(&self, snapshot: MixerSnapshot) -> Result<(), BackendError> {
        let delay = self.delays.lock().get(&snapshot.revision).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.snapshots.lock().push(snapshot);
        if *self.fail.lock() {
            return Err(BackendError::Closed);
        }
        Ok(())
    }
}
