use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::TieBreakPolicy;

/// Root engine configuration.
///
/// Lives inside every `Model` and is replaced by `UpdateConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub features: FeatureToggles,
}

/// Per-message-kind history caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Cap for kinds without an explicit entry (default: 0, no history).
    #[serde(default)]
    pub default_cap: usize,
    /// Message kind (e.g. "Next", "AddText") to cap.
    #[serde(default = "default_history_caps")]
    pub caps: BTreeMap<String, usize>,
}

impl HistoryConfig {
    /// Cap for a message kind, falling back to `default_cap`.
    pub fn cap_for(&self, kind: &str) -> usize {
        self.caps.get(kind).copied().unwrap_or(self.default_cap)
    }
}

/// Text reveal defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Reveal speed used when AddText omits one (0..=100, 100 is instant).
    #[serde(default = "default_speed")]
    pub default_speed: u8,
    /// Policy used when AddText omits one.
    #[serde(default)]
    pub default_tie_break: TieBreakPolicy,
    /// Multiplier for the per-character reveal delay in milliseconds.
    #[serde(default = "default_char_interval_ms")]
    pub char_interval_ms: u64,
}

/// Switches for the built-in middlewares and mixer synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureToggles {
    #[serde(default = "enabled")]
    pub tie_break: bool,
    #[serde(default = "enabled")]
    pub history: bool,
    #[serde(default = "enabled")]
    pub mixer_sync: bool,
}

fn default_history_caps() -> BTreeMap<String, usize> {
    BTreeMap::from([("Next".to_string(), 64), ("AddText".to_string(), 64)])
}

fn default_speed() -> u8 {
    50
}

fn default_char_interval_ms() -> u64 {
    1
}

fn enabled() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_cap: 0,
            caps: default_history_caps(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_speed: default_speed(),
            default_tie_break: TieBreakPolicy::default(),
            char_interval_ms: default_char_interval_ms(),
        }
    }
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            tie_break: true,
            history: true,
            mixer_sync: true,
        }
    }
}
