use std::collections::VecDeque;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::debug;

use crate::mvi::Command;

use crate::engine::message::Message;
use crate::engine::middleware::Next;
use crate::engine::model::{Model, Status};
use crate::engine::reducer::{HandlerResult, SceneReducer, Update};

/// Work a folded Sequence leaves behind for its continuation.
enum PendingStep {
    /// The Delay that suspended the fold.
    Wait(Duration),
    /// A Command returned by one of the folded steps.
    Yield(Command<Message>),
}

impl PendingStep {
    async fn resolve(self) -> Option<Message> {
        match self {
            Self::Wait(duration) => {
                tokio::time::sleep(duration).await;
                None
            }
            Self::Yield(command) => Some(command.await),
        }
    }
}

impl SceneReducer {
    /// Fold the steps up to and including the first Delay.
    ///
    /// The continuation waits for every collected Command concurrently and
    /// yields `Sequence[unprocessed suffix ++ step results in step order]`.
    /// Nested Sequences are spliced in place, so a Delay inside one still
    /// suspends everything after it.
    pub(in crate::engine) fn reduce_sequence(
        &self,
        model: &Model,
        messages: Vec<Message>,
        steps: Next<'_>,
    ) -> HandlerResult {
        if messages.is_empty() {
            return Ok(Update::to(model.clone()));
        }

        let mut current = model.clone();
        if current.status == Status::Delaying || current.status.is_redirect() {
            current.status = Status::Processed;
        }

        let mut queue = VecDeque::from(messages);
        let mut pending = Vec::new();
        while let Some(message) = queue.pop_front() {
            match message {
                Message::Sequence { messages } => {
                    for nested in messages.into_iter().rev() {
                        queue.push_front(nested);
                    }
                }
                Message::Delay { duration_ms } => {
                    current.status = Status::Delaying;
                    pending.push(PendingStep::Wait(Duration::from_millis(duration_ms)));
                    break;
                }
                message => {
                    let update = steps.run(&current, message)?;
                    current = update.state;
                    if let Some(command) = update.command {
                        pending.push(PendingStep::Yield(command));
                    }
                }
            }
        }

        if pending.is_empty() {
            return Ok(Update::to(current));
        }

        let suffix: Vec<Message> = queue.into();
        debug!(
            pending = pending.len(),
            remaining = suffix.len(),
            "Sequence suspended"
        );
        let continuation = Command::new("sequence", async move {
            let results = join_all(pending.into_iter().map(PendingStep::resolve)).await;
            let mut messages = suffix;
            messages.extend(results.into_iter().flatten());
            if messages.is_empty() {
                // Only a trailing Delay was pending.
                Message::DelayCompleted
            } else {
                Message::Sequence { messages }
            }
        });
        Ok(Update::with_command(current, continuation))
    }
}
