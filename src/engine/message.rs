//! The closed set of state-change requests.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::SceneError;
use crate::mixer::LoopRange;
use crate::mvi::Intent;
use crate::widget::{Style, WidgetKind, WidgetProps};

use super::animation::TieBreakPolicy;
use super::model::{Model, ModelProperty};

/// A discrete, serializable state-change request.
///
/// Serialized with a `type` tag, e.g. `{"type": "Delay", "duration_ms": 100}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    // ── General control ──────────────────────────────────────────
    /// Apply the next scenario step and advance the step index.
    Next {
        message: Box<Message>,
    },
    AwaitAction,
    Delay {
        duration_ms: u64,
    },
    DelayCompleted,
    Sequence {
        messages: Vec<Message>,
    },
    SwitchScenario {
        scenario: String,
        index: Option<usize>,
        #[serde(default)]
        reset_state: bool,
    },
    Error {
        error: SceneError,
    },
    RecoverError,
    UpdateConfig {
        config: EngineConfig,
    },
    ResetProperties {
        properties: Vec<ModelProperty>,
    },
    PutModel {
        model: Box<Model>,
    },
    PutCustomState {
        state: Option<Value>,
    },
    /// Extension point for user middlewares.
    Custom {
        name: String,
        #[serde(default)]
        payload: Value,
    },

    // ── Widget mutation ──────────────────────────────────────────
    AddLayout {
        id: String,
        parent_layout_id: Option<String>,
        style: Option<Style>,
    },
    AddTextBox {
        id: String,
        layout_id: String,
        style: Option<Style>,
    },
    AddText {
        id: Option<String>,
        text_box_id: String,
        content: String,
        speed: Option<u8>,
        tie_break_policy: Option<TieBreakPolicy>,
        style: Option<Style>,
    },
    AddImage {
        id: String,
        layout_id: String,
        src: String,
        style: Option<Style>,
    },
    AddButton {
        id: String,
        layout_id: String,
        label: String,
        style: Option<Style>,
    },
    RemoveWidgets {
        ids: Vec<String>,
    },
    ClearTextBox {
        id: String,
    },
    UpdateWidgetStyle {
        id: String,
        kind: WidgetKind,
        style: Style,
    },
    UpdateWidgetProps {
        id: String,
        props: WidgetProps,
    },
    /// Completes the reveal `id` started as reveal number `generation`.
    TextAnimationCompleted {
        id: String,
        #[serde(default)]
        generation: u64,
    },

    // ── Mixer mutation ───────────────────────────────────────────
    AddTrack {
        id: String,
        src: String,
        bus_track_id: Option<String>,
        volume: Option<f32>,
        #[serde(rename = "loop")]
        looping: Option<LoopRange>,
    },
    AddBusTrack {
        id: String,
        volume: Option<f32>,
        parent_bus_track_id: Option<String>,
    },
    RemoveChannel {
        id: String,
    },
    PlayChannel {
        channel_id: String,
        fade_in_ms: Option<u64>,
        delay_ms: Option<u64>,
        offset_ms: Option<u64>,
    },
    StopChannel {
        channel_id: String,
        fade_out_ms: Option<u64>,
    },
    ChangeChannelVolume {
        channel_id: String,
        volume: f32,
    },
    ChangeMasterVolume {
        volume: f32,
    },
    /// Result of applying the mixer snapshot with `revision`.
    ApplyMixerCompleted {
        #[serde(default)]
        revision: u64,
        error: Option<SceneError>,
    },
}

impl Intent for Message {
    fn kind(&self) -> &'static str {
        match self {
            Self::Next { .. } => "Next",
            Self::AwaitAction => "AwaitAction",
            Self::Delay { .. } => "Delay",
            Self::DelayCompleted => "DelayCompleted",
            Self::Sequence { .. } => "Sequence",
            Self::SwitchScenario { .. } => "SwitchScenario",
            Self::Error { .. } => "Error",
            Self::RecoverError => "RecoverError",
            Self::UpdateConfig { .. } => "UpdateConfig",
            Self::ResetProperties { .. } => "ResetProperties",
            Self::PutModel { .. } => "PutModel",
            Self::PutCustomState { .. } => "PutCustomState",
            Self::Custom { .. } => "Custom",
            Self::AddLayout { .. } => "AddLayout",
            Self::AddTextBox { .. } => "AddTextBox",
            Self::AddText { .. } => "AddText",
            Self::AddImage { .. } => "AddImage",
            Self::AddButton { .. } => "AddButton",
            Self::RemoveWidgets { .. } => "RemoveWidgets",
            Self::ClearTextBox { .. } => "ClearTextBox",
            Self::UpdateWidgetStyle { .. } => "UpdateWidgetStyle",
            Self::UpdateWidgetProps { .. } => "UpdateWidgetProps",
            Self::TextAnimationCompleted { .. } => "TextAnimationCompleted",
            Self::AddTrack { .. } => "AddTrack",
            Self::AddBusTrack { .. } => "AddBusTrack",
            Self::RemoveChannel { .. } => "RemoveChannel",
            Self::PlayChannel { .. } => "PlayChannel",
            Self::StopChannel { .. } => "StopChannel",
            Self::ChangeChannelVolume { .. } => "ChangeChannelVolume",
            Self::ChangeMasterVolume { .. } => "ChangeMasterVolume",
            Self::ApplyMixerCompleted { .. } => "ApplyMixerCompleted",
        }
    }
}

impl Message {
    /// Decode a message from JSON.
    ///
    /// Unknown `type` tags and malformed payloads become an `Error`
    /// message citing the offending kind instead of failing.
    pub fn from_value(value: Value) -> Message {
        match serde_json::from_value::<Message>(value.clone()) {
            Ok(message) => message,
            Err(err) => {
                let kind = value
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("<untagged>");
                tracing::warn!(kind = %kind, error = %err, "Rejected undecodable message");
                Message::Error {
                    error: SceneError::unhandled(kind).with_stack(err.to_string()),
                }
            }
        }
    }

    pub fn sequence(messages: impl IntoIterator<Item = Message>) -> Message {
        Message::Sequence {
            messages: messages.into_iter().collect(),
        }
    }

    pub fn next(step: Message) -> Message {
        Message::Next {
            message: Box::new(step),
        }
    }

    pub fn completion(id: impl Into<String>, generation: u64) -> Message {
        Message::TextAnimationCompleted {
            id: id.into(),
            generation,
        }
    }

    /// Messages that move the scenario forward.
    pub fn is_advance(&self) -> bool {
        matches!(self, Self::Next { .. })
    }

    /// Messages that pending `interrupt`/`complete` reveals must precede.
    pub fn is_interceptable(&self) -> bool {
        !matches!(
            self,
            Self::TextAnimationCompleted { .. }
                | Self::Error { .. }
                | Self::RecoverError
                | Self::PutModel { .. }
                | Self::UpdateConfig { .. }
                | Self::SwitchScenario { .. }
                | Self::ApplyMixerCompleted { .. }
                | Self::DelayCompleted
        )
    }

    /// Messages still applied while the Model is in the Error status.
    pub fn passes_error_gate(&self) -> bool {
        matches!(
            self,
            Self::RecoverError
                | Self::Error { .. }
                | Self::PutModel { .. }
                | Self::UpdateConfig { .. }
                | Self::TextAnimationCompleted { .. }
                | Self::ApplyMixerCompleted { .. }
                | Self::DelayCompleted
        )
    }

    /// `(id, generation)` of reveals this message completes, looking
    /// through Sequence and Next.
    pub fn completion_keys(&self, out: &mut HashSet<(String, u64)>) {
        match self {
            Self::TextAnimationCompleted { id, generation } => {
                out.insert((id.clone(), *generation));
            }
            Self::Sequence { messages } => {
                for message in messages {
                    message.completion_keys(out);
                }
            }
            Self::Next { message } => message.completion_keys(out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn decodes_tagged_json() {
        let message = Message::from_value(serde_json::json!({
            "type": "AddText",
            "text_box_id": "box",
            "content": "hello"
        }));
        match message {
            Message::AddText {
                id,
                text_box_id,
                speed,
                ..
            } => {
                assert!(id.is_none());
                assert_eq!(text_box_id, "box");
                assert!(speed.is_none());
            }
            other => panic!("Expected AddText, got {:?}", other),
        }
    }

    #[test]
    fn unknown_kind_becomes_error() {
        let message = Message::from_value(serde_json::json!({ "type": "Teleport" }));
        match message {
            Message::Error { error } => {
                assert_eq!(error.kind, ErrorKind::UnhandledMessage);
                assert!(error.message.contains("Teleport"));
            }
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[test]
    fn completion_keys_look_through_wrappers() {
        let message = Message::sequence([
            Message::completion("a", 1),
            Message::next(Message::sequence([Message::completion("b", 2)])),
            Message::AwaitAction,
        ]);
        let mut keys = HashSet::new();
        message.completion_keys(&mut keys);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&("a".to_string(), 1)));
        assert!(keys.contains(&("b".to_string(), 2)));
    }

    #[test]
    fn completion_generation_defaults_to_zero() {
        let message = Message::from_value(serde_json::json!({
            "type": "TextAnimationCompleted",
            "id": "t1"
        }));
        assert_eq!(message, Message::completion("t1", 0));
    }

    #[test]
    fn kind_matches_serde_tag() {
        let message = Message::ChangeMasterVolume { volume: 0.5 };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], message.kind());
    }
}
