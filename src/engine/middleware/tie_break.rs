use std::collections::HashSet;

use tracing::debug;

use crate::mvi::Intent;

use super::{Middleware, Next};
use crate::engine::animation::{AnimationTicket, TieBreakPolicy};
use crate::engine::message::Message;
use crate::engine::model::{Model, Status};
use crate::engine::reducer::{HandlerResult, Update};

/// Orders pending text reveals against the incoming message.
///
/// Checked in order:
/// 1. `insert` tickets and an advance: completions first, then the advance
///    on the following dispatch (`Status::Inserted`).
/// 2. `merge` tickets and an advance: completions and the advance in one
///    Sequence (`Status::Merged`).
/// 3. `interrupt`/`complete` tickets and any interceptable message:
///    interrupt completions, then complete completions, then the message
///    (`Status::Intercepted`).
///
/// An interceptable message that passes through reaches its handler with
/// `Status::Processed`, so a settled `AwaitingAction` or `Delaying` does
/// not leak into it. The middleware never reduces a redirected message
/// itself; the store dispatches the synthesized message named by the status.
#[derive(Debug, Default)]
pub struct TieBreakMiddleware;

impl Middleware for TieBreakMiddleware {
    fn name(&self) -> &'static str {
        "tie_break"
    }

    fn handle(&self, model: &Model, message: Message, next: Next<'_>) -> HandlerResult {
        if !model.config.features.tie_break || model.status.is_error() {
            return next.run(model, message);
        }

        // Tickets the message already completes are not pending for it.
        let mut completing = HashSet::new();
        message.completion_keys(&mut completing);
        let pending: Vec<&AnimationTicket> = model
            .animation_tickets
            .iter()
            .filter(|ticket| !completing.contains(&(ticket.id.clone(), ticket.generation)))
            .collect();
        if pending.is_empty() {
            return pass(model, message, next);
        }

        if message.is_advance() {
            let inserted = completions(&pending, TieBreakPolicy::Insert);
            if !inserted.is_empty() {
                debug!(count = inserted.len(), "Inserting reveal completions before advance");
                return Ok(redirect(
                    model,
                    Status::Inserted {
                        message: Box::new(Message::sequence(inserted)),
                        before: Box::new(message),
                    },
                ));
            }

            let mut merged = completions(&pending, TieBreakPolicy::Merge);
            if !merged.is_empty() {
                debug!(count = merged.len(), "Merging reveal completions with advance");
                merged.push(message);
                return Ok(redirect(
                    model,
                    Status::Merged {
                        message: Box::new(Message::sequence(merged)),
                    },
                ));
            }
        }

        if message.is_interceptable() {
            let mut forced = completions(&pending, TieBreakPolicy::Interrupt);
            forced.extend(completions(&pending, TieBreakPolicy::Complete));
            if !forced.is_empty() {
                debug!(
                    count = forced.len(),
                    kind = message.kind(),
                    "Intercepting message behind reveal completions"
                );
                forced.push(message);
                return Ok(redirect(
                    model,
                    Status::Intercepted {
                        message: Box::new(Message::sequence(forced)),
                    },
                ));
            }
        }

        pass(model, message, next)
    }
}

/// Hand `message` on; interceptable messages start from `Processed`.
fn pass(model: &Model, message: Message, next: Next<'_>) -> HandlerResult {
    if !message.is_interceptable() || model.status == Status::Processed {
        return next.run(model, message);
    }
    let settled = Model {
        status: Status::Processed,
        ..model.clone()
    };
    next.run(&settled, message)
}

/// Completion messages for tickets with `policy`, in ticket order.
fn completions(pending: &[&AnimationTicket], policy: TieBreakPolicy) -> Vec<Message> {
    pending
        .iter()
        .filter(|ticket| ticket.policy == policy)
        .map(|ticket| ticket.completion())
        .collect()
}

fn redirect(model: &Model, status: Status) -> Update {
    Update::to(Model {
        status,
        ..model.clone()
    })
}
