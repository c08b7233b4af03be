//! One-shot asynchronous follow-ups scheduled by a reducer.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt};

/// A one-shot async operation that yields exactly one follow-up intent.
///
/// Commands are inert until awaited. The transport that owns the state
/// resolves them and feeds the result back through the reducer.
pub struct Command<I> {
    label: &'static str,
    future: BoxFuture<'static, I>,
}

impl<I: Send + 'static> Command<I> {
    /// Wrap an arbitrary future.
    pub fn new<F>(label: &'static str, future: F) -> Self
    where
        F: Future<Output = I> + Send + 'static,
    {
        Self {
            label,
            future: future.boxed(),
        }
    }

    /// Command that yields `intent` immediately.
    pub fn ready(intent: I) -> Self {
        Self::new("ready", future::ready(intent))
    }

    /// Command that yields `intent` after `duration`.
    pub fn delay(duration: Duration, intent: I) -> Self {
        Self::new("delay", async move {
            tokio::time::sleep(duration).await;
            intent
        })
    }

    /// Transform the yielded intent.
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(I) -> I + Send + 'static,
    {
        Self {
            label: self.label,
            future: self.future.map(f).boxed(),
        }
    }
}

impl<I> Command<I> {
    /// Short description used in logs.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<I> IntoFuture for Command<I> {
    type Output = I;
    type IntoFuture = BoxFuture<'static, I>;

    fn into_future(self) -> Self::IntoFuture {
        self.future
    }
}

impl<I> std::fmt::Debug for Command<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command({})", self.label)
    }
}
