//! Core reducer: one case per message kind.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::SceneError;
use crate::mixer::MixerDriver;
use crate::mvi::{Command, Intent, Transition};

use super::handlers::{control, widget};
use super::message::Message;
use super::middleware::Next;
use super::model::Model;

/// Model plus optional follow-up produced by one reducer call.
pub type Update = Transition<Model, Message>;

/// Outcome of a handler. `Err` leaves the Model untouched and is turned
/// into an `Error` message by the pipeline.
pub type HandlerResult = Result<Update, SceneError>;

/// Innermost reducer, parameterized by the mixer synchronization driver.
pub struct SceneReducer {
    pub(super) driver: Arc<dyn MixerDriver>,
}

impl SceneReducer {
    pub fn new(driver: Arc<dyn MixerDriver>) -> Self {
        Self { driver }
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Reduce one message. `steps` is the chain nested messages
    /// (Next payloads, Sequence items) are routed through.
    pub fn reduce(&self, model: &Model, message: Message, steps: Next<'_>) -> HandlerResult {
        if model.status.is_error() && !message.passes_error_gate() {
            warn!(kind = message.kind(), "Dropped message while in error state");
            return Ok(Update::to(model.clone()));
        }

        debug!(kind = message.kind(), index = model.index, "Reducing message");

        match message {
            // General control
            Message::Next { message } => self.advance(model, *message, steps),
            Message::AwaitAction => Ok(control::await_action(model)),
            Message::Delay { duration_ms } => Ok(control::delay(model, duration_ms)),
            Message::DelayCompleted => Ok(control::delay_completed(model)),
            Message::Sequence { messages } => self.reduce_sequence(model, messages, steps),
            Message::SwitchScenario {
                scenario,
                index,
                reset_state,
            } => Ok(self.switch_scenario(model, scenario, index, reset_state)),
            Message::Error { error } => Ok(control::enter_error(model, error)),
            Message::RecoverError => Ok(control::recover_error(model)),
            Message::UpdateConfig { config } => Ok(control::update_config(model, config)),
            Message::ResetProperties { properties } => {
                Ok(self.reset_properties(model, &properties))
            }
            Message::PutModel { model: next } => Ok(self.put_model(model, *next)),
            Message::PutCustomState { state } => Ok(control::put_custom_state(model, state)),
            Message::Custom { name, .. } => Err(SceneError::unhandled(&format!("Custom({})", name))),

            // Widget mutation
            Message::AddLayout {
                id,
                parent_layout_id,
                style,
            } => widget::add_layout(model, id, parent_layout_id, style),
            Message::AddTextBox {
                id,
                layout_id,
                style,
            } => widget::add_text_box(model, id, &layout_id, style),
            Message::AddText {
                id,
                text_box_id,
                content,
                speed,
                tie_break_policy,
                style,
            } => widget::add_text(
                model,
                widget::TextRequest {
                    id,
                    text_box_id,
                    content,
                    speed,
                    policy: tie_break_policy,
                    style,
                },
            ),
            Message::AddImage {
                id,
                layout_id,
                src,
                style,
            } => widget::add_image(model, id, &layout_id, src, style),
            Message::AddButton {
                id,
                layout_id,
                label,
                style,
            } => widget::add_button(model, id, &layout_id, label, style),
            Message::RemoveWidgets { ids } => widget::remove_widgets(model, &ids),
            Message::ClearTextBox { id } => widget::clear_text_box(model, &id),
            Message::UpdateWidgetStyle { id, kind, style } => {
                Ok(widget::update_style(model, &id, kind, &style))
            }
            Message::UpdateWidgetProps { id, props } => {
                Ok(widget::update_props(model, &id, &props))
            }
            Message::TextAnimationCompleted { id, generation } => {
                Ok(widget::complete_animation(model, &id, generation))
            }

            // Mixer mutation
            Message::AddTrack {
                id,
                src,
                bus_track_id,
                volume,
                looping,
            } => self.add_track(model, id, src, bus_track_id, volume, looping),
            Message::AddBusTrack {
                id,
                volume,
                parent_bus_track_id,
            } => self.add_bus_track(model, id, volume, parent_bus_track_id),
            Message::RemoveChannel { id } => self.remove_channel(model, &id),
            Message::PlayChannel {
                channel_id,
                fade_in_ms,
                delay_ms,
                offset_ms,
            } => self.play_channel(model, &channel_id, fade_in_ms, delay_ms, offset_ms),
            Message::StopChannel {
                channel_id,
                fade_out_ms,
            } => self.stop_channel(model, &channel_id, fade_out_ms),
            Message::ChangeChannelVolume { channel_id, volume } => {
                self.change_channel_volume(model, &channel_id, volume)
            }
            Message::ChangeMasterVolume { volume } => Ok(self.change_master_volume(model, volume)),
            Message::ApplyMixerCompleted { revision, error } => {
                Ok(control::apply_mixer_completed(model, revision, error))
            }
        }
    }

    /// Bump the mixer revision and, when synchronization is enabled,
    /// schedule a driver apply of the resulting snapshot.
    pub(super) fn sync_mixer(&self, mut model: Model) -> Update {
        model.mixer.revision += 1;
        if !model.config.features.mixer_sync {
            // Nothing will apply this revision.
            model.mixer.applying = false;
            return Update::to(model);
        }

        model.mixer.applying = true;
        let snapshot = model.mixer.snapshot();
        let driver = self.driver.clone();
        let command = Command::new("apply_mixer", async move {
            let revision = snapshot.revision;
            match driver.apply(snapshot).await {
                Ok(()) => {
                    debug!(driver = driver.name(), revision, "Mixer snapshot applied");
                    Message::ApplyMixerCompleted {
                        revision,
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(driver = driver.name(), revision, error = %err, "Mixer apply failed");
                    Message::ApplyMixerCompleted {
                        revision,
                        error: Some(SceneError::backend(&err)),
                    }
                }
            }
        });
        Update::with_command(model, command)
    }
}
