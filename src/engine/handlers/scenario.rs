use tracing::info;

use crate::engine::message::Message;
use crate::engine::middleware::Next;
use crate::engine::model::{Model, ModelProperty, Status};
use crate::engine::reducer::{HandlerResult, SceneReducer, Update};

impl SceneReducer {
    /// `Next`: mark the step consumed, then reduce its payload through the
    /// step chain. The payload's own status change wins.
    pub(in crate::engine) fn advance(
        &self,
        model: &Model,
        step: Message,
        steps: Next<'_>,
    ) -> HandlerResult {
        let mut next = model.clone();
        next.status = Status::Processed;
        next.index += 1;
        steps.run(&next, step)
    }

    /// Reposition the scenario. With `reset_state`, widgets, tickets and
    /// every mixer channel are dropped and the driver is told to tear down.
    pub(in crate::engine) fn switch_scenario(
        &self,
        model: &Model,
        scenario: String,
        index: Option<usize>,
        reset_state: bool,
    ) -> Update {
        info!(scenario = %scenario, index = ?index, reset_state, "Switching scenario");

        let mut next = model.clone();
        next.status = Status::RequestingNext;
        next.scenario = scenario;
        next.index = index.unwrap_or(0);
        if !reset_state {
            return Update::to(next);
        }

        next.widgets.clear();
        next.animation_tickets.clear();
        next.mixer.channels.clear();
        self.sync_mixer(next)
    }

    pub(in crate::engine) fn reset_properties(
        &self,
        model: &Model,
        properties: &[ModelProperty],
    ) -> Update {
        let mut next = model.clone();
        for property in properties {
            next.reset_property(*property);
        }
        next.prune_tickets();

        if properties.contains(&ModelProperty::Mixer) {
            self.sync_mixer(next)
        } else {
            Update::to(next)
        }
    }

    /// Replace the whole Model. The mixer revision is carried past the
    /// current one so the driver never treats the new snapshot as stale.
    pub(in crate::engine) fn put_model(&self, current: &Model, mut model: Model) -> Update {
        info!(
            scenario = %model.scenario,
            index = model.index,
            "Replacing model"
        );
        if model.status.is_redirect() {
            model.status = Status::Processed;
        }
        model.mixer.applying = false;
        model.mixer.revision = model.mixer.revision.max(current.mixer.revision);
        // Timers still in flight carry generations up to the current one.
        model.reveal_generation = model.reveal_generation.max(current.reveal_generation);
        self.sync_mixer(model)
    }
}
