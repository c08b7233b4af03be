//! Ordered wrappers around the core reducer.
//!
//! A middleware sees every message before the reducer does and decides
//! whether to pass it on (`next.run`), rewrite it, or answer itself.
//!
//! ```text
//! History → TieBreak → user middlewares… → SceneReducer
//!                      └──── step chain ────┘
//! ```
//!
//! Messages nested inside `Next` and `Sequence` re-enter at the start of
//! the step chain, so built-ins only ever see top-level dispatches.

mod history;
mod tie_break;

use std::sync::Arc;

use super::message::Message;
use super::model::Model;
use super::reducer::{HandlerResult, SceneReducer};

pub use history::HistoryMiddleware;
pub use tie_break::TieBreakMiddleware;

/// A wrapper around the reducer.
pub trait Middleware: Send + Sync {
    /// Returns the name of this middleware for logging.
    fn name(&self) -> &'static str;

    fn handle(&self, model: &Model, message: Message, next: Next<'_>) -> HandlerResult;
}

/// The remainder of the chain after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    steps: &'a [Arc<dyn Middleware>],
    core: &'a SceneReducer,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        chain: &'a [Arc<dyn Middleware>],
        steps: &'a [Arc<dyn Middleware>],
        core: &'a SceneReducer,
    ) -> Self {
        Self { chain, steps, core }
    }

    /// Pass `message` to the next middleware, or to the reducer at the end.
    pub fn run(self, model: &Model, message: Message) -> HandlerResult {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(model, message, Next { chain: rest, ..self }),
            None => self.core.reduce(
                model,
                message,
                Next {
                    chain: self.steps,
                    ..self
                },
            ),
        }
    }
}
