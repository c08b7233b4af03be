//! Model-View-Intent (MVI) primitives with asynchronous follow-ups.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Reducer ──→ Transition { State, Command? }
//!    ↑                                   │
//!    └──────────── Command resolves ─────┘
//! ```
//!
//! - **State**: Immutable snapshot, replaced wholesale on every transition
//! - **Intent**: Discrete state-change request
//! - **Reducer**: Pure function from (State, Intent) to a Transition
//! - **Command**: One-shot async operation yielding exactly one follow-up Intent

mod command;
mod intent;
mod reducer;
mod state;

pub use command::Command;
pub use intent::Intent;
pub use reducer::{Reducer, Transition};
pub use state::State;
