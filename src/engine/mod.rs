//! Scene engine: Model, messages, reducer, middlewares and transport.
//!
//! # Architecture
//!
//! ```text
//! Store::dispatch(Message)
//!     │
//!     ▼
//! Pipeline ── History → TieBreak → user middlewares → SceneReducer
//!     │
//!     ▼
//! Transition { Model, Command? } ──→ Command resolves ──→ dispatch
//! ```
//!
//! - `model.rs` - Model, Status and mixer bookkeeping
//! - `message.rs` - The closed Message set
//! - `reducer.rs` - Core reducer dispatching to `handlers/`
//! - `middleware/` - Middleware trait, history and tie-break built-ins
//! - `pipeline.rs` - Middleware chain plus error boundary
//! - `store.rs` - Single-writer transport and observers
//! - `animation.rs` - Reveal tickets and tie-break policies
//! - `history.rs` - Bounded per-kind message log

mod animation;
mod handlers;
mod history;
mod message;
mod middleware;
mod model;
mod pipeline;
mod reducer;
mod store;

pub use animation::{reveal_ttl_ms, AnimationTicket, TieBreakPolicy, INSTANT_SPEED};
pub use history::HistoryLog;
pub use message::Message;
pub use middleware::{HistoryMiddleware, Middleware, Next, TieBreakMiddleware};
pub use model::{MixerState, Model, ModelProperty, Status};
pub use pipeline::Pipeline;
pub use reducer::{HandlerResult, SceneReducer, Update};
pub use store::{ListenerId, Store};
