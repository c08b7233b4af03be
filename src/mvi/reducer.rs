//! Reducer trait for MVI architecture.

use super::command::Command;
use super::intent::Intent;
use super::state::State;

/// Result of a single reducer call: the replacement state plus an optional
/// command whose result re-enters the same reducer.
pub struct Transition<S, I> {
    pub state: S,
    pub command: Option<Command<I>>,
}

impl<S, I> Transition<S, I> {
    /// Transition without a follow-up.
    pub fn to(state: S) -> Self {
        Self {
            state,
            command: None,
        }
    }

    /// Transition that schedules a follow-up command.
    pub fn with_command(state: S, command: Command<I>) -> Self {
        Self {
            state,
            command: Some(command),
        }
    }
}

impl<S: std::fmt::Debug, I> std::fmt::Debug for Transition<S, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("state", &self.state)
            .field("command", &self.command.as_ref().map(Command::label))
            .finish()
    }
}

/// Reducer transforms state based on intents.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Intent) -> (State, Command?).
/// Side effects live inside the returned command and run only when the
/// caller resolves it.
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: State;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Process an intent and return the transition.
    fn reduce(
        &self,
        state: &Self::State,
        intent: Self::Intent,
    ) -> Transition<Self::State, Self::Intent>;
}
