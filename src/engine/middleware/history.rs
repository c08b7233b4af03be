use crate::mvi::Intent;

use super::{Middleware, Next};
use crate::engine::message::Message;
use crate::engine::model::Model;
use crate::engine::reducer::HandlerResult;

/// Outermost wrapper: records each applied message under its kind.
///
/// Messages that fail, are dropped by the error gate, or are turned into a
/// redirect by the tie-break middleware are not recorded; the synthesized
/// message that replaces them is.
#[derive(Debug, Default)]
pub struct HistoryMiddleware;

impl Middleware for HistoryMiddleware {
    fn name(&self) -> &'static str {
        "history"
    }

    fn handle(&self, model: &Model, message: Message, next: Next<'_>) -> HandlerResult {
        let gated = model.status.is_error() && !message.passes_error_gate();
        if !model.config.features.history || gated {
            return next.run(model, message);
        }

        let kind = message.kind();
        let entry = message.clone();
        let mut update = next.run(model, message)?;
        if update.state.status.is_redirect() {
            return Ok(update);
        }

        let cap = update.state.config.history.cap_for(kind);
        update.state.history.record(kind, entry, cap);
        Ok(update)
    }
}
