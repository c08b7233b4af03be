//! Single-writer transport around the pipeline.
//!
//! The store owns the only live Model. Dispatches are applied one at a
//! time; Commands run concurrently in the background and their results
//! re-enter through `dispatch` in completion order.

use std::collections::VecDeque;
use std::future::IntoFuture;

use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::mvi::{Intent, Reducer, Transition};

use super::message::Message;
use super::model::{Model, Status};
use super::pipeline::Pipeline;

/// Handle returned by [`Store::subscribe`].
pub type ListenerId = u64;

type Listener = Box<dyn Fn(&Model) + Send + Sync>;

pub struct Store {
    model: Model,
    pipeline: Pipeline,
    in_flight: FuturesUnordered<BoxFuture<'static, Message>>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
}

impl Store {
    pub fn new(pipeline: Pipeline) -> Self {
        Self::with_model(pipeline, Model::default())
    }

    pub fn with_model(pipeline: Pipeline, model: Model) -> Self {
        Self {
            model,
            pipeline,
            in_flight: FuturesUnordered::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// The current Model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Register an observer called after every committed Model.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&Model) + Send + Sync + 'static,
    {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of Commands not yet resolved.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Apply `message` and any redirects it causes, queueing Commands.
    ///
    /// A redirect status is followed only on the step that produced it;
    /// `Inserted` dispatches its completions, then the original message.
    pub fn dispatch(&mut self, message: Message) {
        let mut queue = VecDeque::from([message]);
        while let Some(message) = queue.pop_front() {
            let kind = message.kind();
            let Transition { state, command } = self.pipeline.reduce(&self.model, message);

            if let Some(command) = command {
                debug!(kind, command = command.label(), "Queued command");
                self.in_flight.push(command.into_future());
            }

            let redirected = state.status.is_redirect() && state.status != self.model.status;
            self.commit(state);

            if !redirected {
                continue;
            }
            match &self.model.status {
                Status::Inserted { message, before } => {
                    queue.push_front(Message::clone(before));
                    queue.push_front(Message::clone(message));
                }
                Status::Merged { message } | Status::Intercepted { message } => {
                    queue.push_front(Message::clone(message));
                }
                _ => {}
            }
        }
    }

    /// Wait for the next Command to resolve and dispatch its result.
    /// Returns false when nothing is in flight.
    pub async fn next_command(&mut self) -> bool {
        match self.in_flight.next().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Resolve Commands until none remain.
    pub async fn settle(&mut self) {
        while self.next_command().await {}
    }

    /// Serve `inbox` until it closes, interleaving Command results, then
    /// settle and return the final Model.
    pub async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Message>) -> Model {
        info!(driver = self.pipeline.driver_name(), "Store running");
        loop {
            let message = tokio::select! {
                received = inbox.recv() => match received {
                    Some(message) => message,
                    None => break,
                },
                Some(message) = self.in_flight.next(), if !self.in_flight.is_empty() => message,
            };
            self.dispatch(message);
        }
        self.settle().await;
        info!(scenario = %self.model.scenario, index = self.model.index, "Store stopped");
        self.model
    }

    fn commit(&mut self, model: Model) {
        self.model = model;
        for (_, listener) in &self.listeners {
            listener(&self.model);
        }
    }
}
