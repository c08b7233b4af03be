//! Bounded per-message-kind log of applied messages.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::HistoryConfig;

use super::message::Message;

/// Sliding windows of recently applied messages, keyed by message kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: BTreeMap<String, VecDeque<Message>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` under `kind`, evicting the oldest entries beyond `cap`.
    /// A cap of 0 keeps the list empty.
    pub fn record(&mut self, kind: &str, message: Message, cap: usize) {
        if cap == 0 {
            self.entries.remove(kind);
            return;
        }
        let list = self.entries.entry(kind.to_string()).or_default();
        list.push_back(message);
        while list.len() > cap {
            list.pop_front();
        }
    }

    /// Re-apply the caps of `config` to every list.
    pub fn trim(&mut self, config: &HistoryConfig) {
        self.entries.retain(|kind, list| {
            let cap = config.cap_for(kind);
            while list.len() > cap {
                list.pop_front();
            }
            !list.is_empty()
        });
    }

    /// Messages recorded for `kind`, oldest first.
    pub fn get(&self, kind: &str) -> Vec<&Message> {
        self.entries
            .get(kind)
            .map(|list| list.iter().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, kind: &str) -> usize {
        self.entries.get(kind).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(ms: u64) -> Message {
        Message::Delay { duration_ms: ms }
    }

    #[test]
    fn sliding_window_keeps_most_recent() {
        let mut log = HistoryLog::new();
        for ms in 1..=4 {
            log.record("Delay", delay(ms), 3);
        }
        assert_eq!(log.len("Delay"), 3);
        assert_eq!(log.get("Delay"), vec![&delay(2), &delay(3), &delay(4)]);
    }

    #[test]
    fn zero_cap_stays_empty() {
        let mut log = HistoryLog::new();
        log.record("Delay", delay(1), 0);
        assert!(log.is_empty());
        assert!(log.get("Delay").is_empty());
    }

    #[test]
    fn trim_applies_new_caps() {
        let mut log = HistoryLog::new();
        for ms in 1..=5 {
            log.record("Delay", delay(ms), 10);
        }
        let mut config = HistoryConfig::default();
        config.caps.insert("Delay".to_string(), 2);
        log.trim(&config);
        assert_eq!(log.get("Delay"), vec![&delay(4), &delay(5)]);

        config.caps.insert("Delay".to_string(), 0);
        log.trim(&config);
        assert!(log.is_empty());
    }
}
