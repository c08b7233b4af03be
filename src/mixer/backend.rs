//! Live audio backend abstraction and an in-memory implementation.
//!
//! The backend is the only mutable shared resource in the system. It is
//! owned by a `Reconciler` and mutated exclusively through this trait.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use super::channel::LoopRange;

/// Opaque handle to a backend node (player or gain).
pub type NodeId = u64;

/// Opaque handle to a decoded source buffer.
pub type BufferId = u64;

/// Errors reported by an audio backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Fetching or decoding a source failed.
    #[error("Failed to load source '{src}'")]
    SourceUnavailable {
        src: String,
        #[source]
        source: std::io::Error,
    },

    /// A node handle did not resolve.
    #[error("Unknown backend node {node}")]
    UnknownNode { node: NodeId },

    /// The backend has been shut down.
    #[error("Audio backend closed")]
    Closed,
}

/// Where a gain node sends its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Master,
    Node(NodeId),
}

/// Scheduling options for starting a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartOptions {
    pub delay_ms: u64,
    pub offset_ms: u64,
}

/// Stateful audio graph driven by the reconciler.
#[async_trait]
pub trait AudioBackend: Send {
    /// Fetch and decode a source.
    async fn load(&mut self, src: &str) -> Result<BufferId, BackendError>;

    /// Create a gain node connected to `destination`.
    fn create_gain(&mut self, destination: Destination) -> Result<NodeId, BackendError>;

    /// Create a one-shot player for `buffer` connected to the gain node `output`.
    fn create_player(
        &mut self,
        buffer: BufferId,
        output: NodeId,
        looping: Option<LoopRange>,
    ) -> Result<NodeId, BackendError>;

    /// Set a gain, optionally ramping linearly over `ramp_ms`.
    fn set_volume(
        &mut self,
        gain: NodeId,
        volume: f32,
        ramp_ms: Option<u64>,
    ) -> Result<(), BackendError>;

    fn start(&mut self, player: NodeId, options: StartOptions) -> Result<(), BackendError>;

    fn stop(&mut self, player: NodeId) -> Result<(), BackendError>;

    /// Disconnect and free a node.
    fn release(&mut self, node: NodeId) -> Result<(), BackendError>;

    fn set_master_volume(&mut self, volume: f32);
}

/// One observable backend mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Loaded {
        src: String,
        buffer: BufferId,
    },
    GainCreated {
        node: NodeId,
        destination: Destination,
    },
    PlayerCreated {
        node: NodeId,
        buffer: BufferId,
        output: NodeId,
    },
    VolumeSet {
        node: NodeId,
        volume: f32,
        ramp_ms: Option<u64>,
    },
    Started {
        node: NodeId,
        options: StartOptions,
    },
    Stopped {
        node: NodeId,
    },
    Released {
        node: NodeId,
    },
    MasterVolume {
        volume: f32,
    },
}

#[derive(Default)]
struct MemoryInner {
    next_id: u64,
    live: HashSet<NodeId>,
    failing: HashSet<String>,
    events: Vec<BackendEvent>,
}

/// In-memory backend that records every mutation.
///
/// Clones share the same log, so a test can keep one handle while the
/// reconciler owns another.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `load(src)` fail.
    pub fn fail_source(&self, src: impl Into<String>) {
        self.inner.lock().failing.insert(src.into());
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<BackendEvent> {
        self.inner.lock().events.clone()
    }

    /// Number of live (created and not yet released) nodes.
    pub fn live_nodes(&self) -> usize {
        self.inner.lock().live.len()
    }

    fn alloc(inner: &mut MemoryInner) -> u64 {
        inner.next_id += 1;
        inner.next_id
    }

    fn check(inner: &MemoryInner, node: NodeId) -> Result<(), BackendError> {
        if inner.live.contains(&node) {
            Ok(())
        } else {
            Err(BackendError::UnknownNode { node })
        }
    }
}

#[async_trait]
impl AudioBackend for MemoryBackend {
    async fn load(&mut self, src: &str) -> Result<BufferId, BackendError> {
        let mut inner = self.inner.lock();
        if inner.failing.contains(src) {
            return Err(BackendError::SourceUnavailable {
                src: src.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "source rejected"),
            });
        }
        let buffer = Self::alloc(&mut inner);
        inner.events.push(BackendEvent::Loaded {
            src: src.to_string(),
            buffer,
        });
        Ok(buffer)
    }

    fn create_gain(&mut self, destination: Destination) -> Result<NodeId, BackendError> {
        let mut inner = self.inner.lock();
        if let Destination::Node(parent) = destination {
            Self::check(&inner, parent)?;
        }
        let node = Self::alloc(&mut inner);
        inner.live.insert(node);
        inner
            .events
            .push(BackendEvent::GainCreated { node, destination });
        Ok(node)
    }

    fn create_player(
        &mut self,
        buffer: BufferId,
        output: NodeId,
        _looping: Option<LoopRange>,
    ) -> Result<NodeId, BackendError> {
        let mut inner = self.inner.lock();
        Self::check(&inner, output)?;
        let node = Self::alloc(&mut inner);
        inner.live.insert(node);
        inner.events.push(BackendEvent::PlayerCreated {
            node,
            buffer,
            output,
        });
        Ok(node)
    }

    fn set_volume(
        &mut self,
        gain: NodeId,
        volume: f32,
        ramp_ms: Option<u64>,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        Self::check(&inner, gain)?;
        inner.events.push(BackendEvent::VolumeSet {
            node: gain,
            volume,
            ramp_ms,
        });
        Ok(())
    }

    fn start(&mut self, player: NodeId, options: StartOptions) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        Self::check(&inner, player)?;
        inner.events.push(BackendEvent::Started {
            node: player,
            options,
        });
        Ok(())
    }

    fn stop(&mut self, player: NodeId) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        Self::check(&inner, player)?;
        inner.events.push(BackendEvent::Stopped { node: player });
        Ok(())
    }

    fn release(&mut self, node: NodeId) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        if !inner.live.remove(&node) {
            return Err(BackendError::UnknownNode { node });
        }
        inner.events.push(BackendEvent::Released { node });
        Ok(())
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.inner
            .lock()
            .events
            .push(BackendEvent::MasterVolume { volume });
    }
}
