//! Declarative audio mixing graph and its synchronization driver.
//!
//! # Architecture
//!
//! ```text
//! Model.mixer ──snapshot──→ MixerDriver::apply ──→ Reconciler ──→ AudioBackend
//! ```
//!
//! - `channel.rs` - Track / BusTrack values and the snapshot type
//! - `tree.rs` - Persistent tree operations (add, remove, map, filter)
//! - `driver.rs` - The async driver seam used by the reducer
//! - `reconcile.rs` - Diff-based driver over a stateful backend
//! - `backend.rs` - Backend trait plus an in-memory recording backend

mod backend;
mod channel;
mod driver;
mod reconcile;
mod tree;

pub use backend::{
    AudioBackend, BackendError, BackendEvent, BufferId, Destination, MemoryBackend, NodeId,
    StartOptions,
};
pub use channel::{BusTrack, Channel, LoopRange, MixerSnapshot, PlayStatus, Timing, Track};
pub use driver::{MixerDriver, NoopDriver};
pub use reconcile::Reconciler;
pub use tree::{
    add_channel, filter_channels, find_channel, has_channel, map_channels, remove_channel,
    update_channel, ChannelTree,
};
