//! Base trait for intents (state-change requests) in MVI architecture.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - Scenario steps fed by the caller
/// - Follow-ups produced by resolved commands (timers, backend calls)
/// - Control requests (errors, recovery, configuration)
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {
    /// Stable name of the intent variant, used as a grouping key.
    fn kind(&self) -> &'static str;
}
