//! The single authoritative state snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::SceneError;
use crate::mixer::{Channel, MixerSnapshot};
use crate::mvi::State;
use crate::widget::WidgetTree;

use super::animation::AnimationTicket;
use super::history::HistoryLog;
use super::message::Message;

/// Finite-state tag telling the caller what it may do next.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum Status {
    /// A message was applied; the caller may feed the next step.
    Processed,
    /// The scenario position was (re)set; the step at `index` is expected.
    #[default]
    RequestingNext,
    /// A step asked for user input before advancing.
    AwaitingAction,
    /// A Delay is in flight.
    Delaying,
    /// Pending reveals must be applied first, then `before` is dispatched again.
    Inserted {
        message: Box<Message>,
        before: Box<Message>,
    },
    /// The incoming advance was folded into `message` together with completions.
    Merged { message: Box<Message> },
    /// The incoming message was wrapped behind forced completions.
    Intercepted { message: Box<Message> },
    /// Terminal until `RecoverError`.
    Error { error: SceneError },
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// True for the statuses that ask the transport to dispatch a
    /// synthesized message instead of the one just received.
    pub fn is_redirect(&self) -> bool {
        matches!(
            self,
            Self::Inserted { .. } | Self::Merged { .. } | Self::Intercepted { .. }
        )
    }
}

/// Declarative mixer tree plus synchronization bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixerState {
    #[serde(default)]
    pub channels: Vec<Arc<Channel>>,
    pub master_volume: f32,
    /// True while the apply for the current `revision` is in flight.
    #[serde(default)]
    pub applying: bool,
    #[serde(default)]
    pub revision: u64,
}

impl MixerState {
    pub fn snapshot(&self) -> MixerSnapshot {
        MixerSnapshot {
            channels: self.channels.clone(),
            master_volume: self.master_volume,
            revision: self.revision,
        }
    }
}

impl Default for MixerState {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            master_volume: 1.0,
            applying: false,
            revision: 0,
        }
    }
}

/// Groups of Model fields that `ResetProperties` can restore to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelProperty {
    Widgets,
    Mixer,
    AnimationTickets,
    Scenario,
    History,
    CustomState,
    Error,
}

/// Engine state snapshot. Replaced wholesale by every reducer call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    pub status: Status,
    #[serde(default)]
    pub widgets: WidgetTree,
    #[serde(default)]
    pub mixer: MixerState,
    #[serde(default)]
    pub animation_tickets: Vec<AnimationTicket>,
    /// Generation handed to the most recent reveal. Never reset.
    #[serde(default)]
    pub reveal_generation: u64,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub history: HistoryLog,
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub custom_state: Option<Value>,
    #[serde(default)]
    pub error: Option<SceneError>,
}

impl State for Model {}

impl Model {
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn ticket(&self, id: &str) -> Option<&AnimationTicket> {
        self.animation_tickets.iter().find(|t| t.id == id)
    }

    /// True if the pending ticket for `id` was issued as `generation`.
    pub fn has_ticket(&self, id: &str, generation: u64) -> bool {
        self.animation_tickets
            .iter()
            .any(|t| t.id == id && t.generation == generation)
    }

    /// Restore one property group to its default. Mixer master volume
    /// and revision survive so the backend sees a newer snapshot.
    pub(crate) fn reset_property(&mut self, property: ModelProperty) {
        match property {
            ModelProperty::Widgets => self.widgets.clear(),
            ModelProperty::Mixer => {
                self.mixer.channels.clear();
                self.mixer.master_volume = 1.0;
            }
            ModelProperty::AnimationTickets => self.animation_tickets.clear(),
            ModelProperty::Scenario => {
                self.scenario.clear();
                self.index = 0;
            }
            ModelProperty::History => self.history = HistoryLog::default(),
            ModelProperty::CustomState => self.custom_state = None,
            ModelProperty::Error => self.error = None,
        }
    }

    /// Drop tickets whose Text node no longer exists.
    pub(crate) fn prune_tickets(&mut self) {
        let widgets = &self.widgets;
        self.animation_tickets
            .retain(|ticket| crate::widget::has_id(widgets, &ticket.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_model_requests_next() {
        let model = Model::default();
        assert_eq!(model.status, Status::RequestingNext);
        assert_eq!(model.mixer.master_volume, 1.0);
        assert!(model.widgets.is_empty());
    }

    #[test]
    fn error_status_serializes_as_record() {
        let model = Model {
            status: Status::Error {
                error: SceneError::new(ErrorKind::NotFound, "gone"),
            },
            ..Model::default()
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["status"]["state"], "Error");
        assert_eq!(json["status"]["error"]["name"], "NotFoundError");
        assert_eq!(json["status"]["error"]["message"], "gone");
    }

    #[test]
    fn redirect_statuses() {
        let message = Box::new(Message::AwaitAction);
        assert!(Status::Merged { message }.is_redirect());
        assert!(!Status::Delaying.is_redirect());
    }
}
