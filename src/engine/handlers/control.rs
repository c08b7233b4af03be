use std::time::Duration;

use serde_json::Value;
use tracing::{error, info};

use crate::config::EngineConfig;
use crate::error::SceneError;
use crate::mvi::Command;

use crate::engine::message::Message;
use crate::engine::model::{Model, Status};
use crate::engine::reducer::Update;

pub(in crate::engine) fn await_action(model: &Model) -> Update {
    Update::to(Model {
        status: Status::AwaitingAction,
        ..model.clone()
    })
}

pub(in crate::engine) fn delay(model: &Model, duration_ms: u64) -> Update {
    let next = Model {
        status: Status::Delaying,
        ..model.clone()
    };
    Update::with_command(
        next,
        Command::delay(Duration::from_millis(duration_ms), Message::DelayCompleted),
    )
}

pub(in crate::engine) fn delay_completed(model: &Model) -> Update {
    if model.status != Status::Delaying {
        return Update::to(model.clone());
    }
    Update::to(Model {
        status: Status::Processed,
        ..model.clone()
    })
}

pub(in crate::engine) fn enter_error(model: &Model, err: SceneError) -> Update {
    error!(error = %err, scenario = %model.scenario, index = model.index, "Entered error state");
    Update::to(Model {
        status: Status::Error { error: err.clone() },
        error: Some(err),
        ..model.clone()
    })
}

pub(in crate::engine) fn recover_error(model: &Model) -> Update {
    if model.status.is_error() {
        info!("Recovered from error state");
    }
    Update::to(Model {
        status: Status::Processed,
        error: None,
        ..model.clone()
    })
}

pub(in crate::engine) fn update_config(model: &Model, config: EngineConfig) -> Update {
    let mut next = model.clone();
    next.history.trim(&config.history);
    next.config = config;
    Update::to(next)
}

pub(in crate::engine) fn put_custom_state(model: &Model, state: Option<Value>) -> Update {
    Update::to(Model {
        custom_state: state,
        ..model.clone()
    })
}

/// Settle the driver apply of `revision`; a backend failure becomes a
/// follow-up Error. `applying` stays set while a newer revision is pending.
pub(in crate::engine) fn apply_mixer_completed(
    model: &Model,
    revision: u64,
    err: Option<SceneError>,
) -> Update {
    let mut next = model.clone();
    if revision >= model.mixer.revision {
        next.mixer.applying = false;
    }
    match err {
        Some(error) => Update::with_command(next, Command::ready(Message::Error { error })),
        None => Update::to(next),
    }
}
