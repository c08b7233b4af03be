//! Pending timed text-reveal completions.

use serde::{Deserialize, Serialize};

use super::message::Message;

/// Reveal speed at or above which text appears instantly.
pub const INSTANT_SPEED: u8 = 100;

/// Rule deciding how a pending reveal is ordered against an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreakPolicy {
    /// Complete before an advance; the advance follows on the next dispatch.
    #[default]
    Insert,
    /// Complete in the same dispatch as the advance.
    Merge,
    /// Complete ahead of any other message, after interrupt tickets.
    Complete,
    /// Complete ahead of any other message, first.
    Interrupt,
}

/// A reveal whose completion message has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationTicket {
    /// Id of the Text node being revealed.
    pub id: String,
    /// Reveal number from `Model::reveal_generation`. A reused Text id
    /// gets a new generation, so a stale timer never matches it.
    #[serde(default)]
    pub generation: u64,
    pub ttl_ms: u64,
    pub policy: TieBreakPolicy,
}

impl AnimationTicket {
    /// The message that completes this reveal.
    pub fn completion(&self) -> Message {
        Message::completion(self.id.clone(), self.generation)
    }
}

/// Reveal duration for `content` at `speed`.
///
/// Each character waits `(100 - speed) * char_interval_ms` milliseconds.
pub fn reveal_ttl_ms(content: &str, speed: u8, char_interval_ms: u64) -> u64 {
    let per_char = u64::from(INSTANT_SPEED.saturating_sub(speed)) * char_interval_ms;
    content.chars().count() as u64 * per_char
}
