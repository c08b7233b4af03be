use std::sync::Arc;

use crate::error::TreeError;
use crate::mixer::{self, BusTrack, Channel, ChannelTree, LoopRange, PlayStatus, Timing, Track};

use crate::engine::model::Model;
use crate::engine::reducer::{HandlerResult, SceneReducer, Update};

impl SceneReducer {
    pub(in crate::engine) fn add_track(
        &self,
        model: &Model,
        id: String,
        src: String,
        bus_track_id: Option<String>,
        volume: Option<f32>,
        looping: Option<LoopRange>,
    ) -> HandlerResult {
        let track = Track {
            volume: volume.unwrap_or(1.0),
            looping,
            ..Track::new(id, src)
        };
        let mut next = model.clone();
        next.mixer.channels =
            mixer::add_channel(&model.mixer.channels, track.into(), bus_track_id.as_deref())?;
        Ok(self.sync_mixer(next))
    }

    pub(in crate::engine) fn add_bus_track(
        &self,
        model: &Model,
        id: String,
        volume: Option<f32>,
        parent_bus_track_id: Option<String>,
    ) -> HandlerResult {
        let bus = BusTrack {
            volume: volume.unwrap_or(1.0),
            ..BusTrack::new(id)
        };
        let mut next = model.clone();
        next.mixer.channels = mixer::add_channel(
            &model.mixer.channels,
            bus.into(),
            parent_bus_track_id.as_deref(),
        )?;
        Ok(self.sync_mixer(next))
    }

    pub(in crate::engine) fn remove_channel(&self, model: &Model, id: &str) -> HandlerResult {
        let mut next = model.clone();
        next.mixer.channels = mixer::remove_channel(&model.mixer.channels, id)?;
        Ok(self.sync_mixer(next))
    }

    pub(in crate::engine) fn play_channel(
        &self,
        model: &Model,
        channel_id: &str,
        fade_in_ms: Option<u64>,
        delay_ms: Option<u64>,
        offset_ms: Option<u64>,
    ) -> HandlerResult {
        let channels = update_track(&model.mixer.channels, channel_id, |track| Track {
            play_status: PlayStatus::Playing,
            timing: Timing {
                fade_in_ms,
                delay_ms,
                offset_ms,
                ..track.timing
            },
            ..track.clone()
        })?;
        Ok(self.sync_mixer(with_channels(model, channels)))
    }

    pub(in crate::engine) fn stop_channel(
        &self,
        model: &Model,
        channel_id: &str,
        fade_out_ms: Option<u64>,
    ) -> HandlerResult {
        let channels = update_track(&model.mixer.channels, channel_id, |track| Track {
            play_status: PlayStatus::Stopped,
            timing: Timing {
                fade_out_ms,
                ..track.timing
            },
            ..track.clone()
        })?;
        Ok(self.sync_mixer(with_channels(model, channels)))
    }

    pub(in crate::engine) fn change_channel_volume(
        &self,
        model: &Model,
        channel_id: &str,
        volume: f32,
    ) -> HandlerResult {
        let channels =
            mixer::update_channel(&model.mixer.channels, channel_id, |c| c.with_volume(volume))?;
        Ok(self.sync_mixer(with_channels(model, channels)))
    }

    pub(in crate::engine) fn change_master_volume(&self, model: &Model, volume: f32) -> Update {
        let mut next = model.clone();
        next.mixer.master_volume = volume;
        self.sync_mixer(next)
    }
}

fn with_channels(model: &Model, channels: ChannelTree) -> Model {
    let mut next = model.clone();
    next.mixer.channels = channels;
    next
}

/// Like `update_channel`, but a BusTrack target counts as missing.
fn update_track<F>(
    channels: &[Arc<Channel>],
    id: &str,
    f: F,
) -> Result<ChannelTree, TreeError>
where
    F: Fn(&Track) -> Track,
{
    match mixer::find_channel(channels, id).map(|c| c.as_ref()) {
        Some(Channel::Track(_)) => {}
        _ => return Err(TreeError::NotFound { id: id.to_string() }),
    }
    mixer::update_channel(channels, id, |channel| match channel {
        Channel::Track(track) => Channel::Track(f(track)),
        other => other.clone(),
    })
}
