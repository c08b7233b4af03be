//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod recording_driver;

use std::path::PathBuf;
use std::sync::Arc;

use scene_engine::engine::{Message, Pipeline, Store, TieBreakPolicy};
use scene_engine::mixer::{MemoryBackend, NoopDriver, Reconciler};
use tempfile::TempDir;

pub use recording_driver::RecordingDriver;

/// Store whose mixer reconciles against a recording in-memory backend.
pub fn backend_store() -> (Store, MemoryBackend) {
    let backend = MemoryBackend::new();
    let driver = Arc::new(Reconciler::new(backend.clone()));
    (Store::new(Pipeline::new(driver)), backend)
}

/// Store whose mixer driver accepts every snapshot.
pub fn noop_store() -> Store {
    Store::new(Pipeline::new(Arc::new(NoopDriver)))
}

/// Store with a driver that records every snapshot it receives.
pub fn recording_store() -> (Store, RecordingDriver) {
    let driver = RecordingDriver::new();
    (Store::new(Pipeline::new(Arc::new(driver.clone()))), driver)
}

/// `root` Layout holding the `box` TextBox.
pub fn stage() -> Vec<Message> {
    vec![
        Message::AddLayout {
            id: "root".to_string(),
            parent_layout_id: None,
            style: None,
        },
        Message::AddTextBox {
            id: "box".to_string(),
            layout_id: "root".to_string(),
            style: None,
        },
    ]
}

pub fn dispatch_all(store: &mut Store, messages: impl IntoIterator<Item = Message>) {
    for message in messages {
        store.dispatch(message);
    }
}

/// AddText into `box`.
pub fn text(id: &str, content: &str, speed: u8, policy: TieBreakPolicy) -> Message {
    Message::AddText {
        id: Some(id.to_string()),
        text_box_id: "box".to_string(),
        content: content.to_string(),
        speed: Some(speed),
        tie_break_policy: Some(policy),
        style: None,
    }
}

pub fn add_track(id: &str, src: &str) -> Message {
    Message::AddTrack {
        id: id.to_string(),
        src: src.to_string(),
        bus_track_id: None,
        volume: None,
        looping: None,
    }
}

pub fn play(id: &str) -> Message {
    Message::PlayChannel {
        channel_id: id.to_string(),
        fade_in_ms: None,
        delay_ms: None,
        offset_ms: None,
    }
}

pub fn custom_state(value: serde_json::Value) -> Message {
    Message::PutCustomState { state: Some(value) }
}

/// Write `content` to a `config.toml` inside a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
