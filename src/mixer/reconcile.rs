//! Diff-based reconciliation of a live backend against mixer snapshots.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::backend::{AudioBackend, BackendError, BufferId, Destination, NodeId, StartOptions};
use super::channel::{Channel, MixerSnapshot, PlayStatus, Track};
use super::driver::MixerDriver;

/// Backend resources owned by one applied channel.
#[derive(Debug, Clone)]
enum Applied {
    Track {
        parent: Option<String>,
        buffer: BufferId,
        gain: NodeId,
        player: NodeId,
        status: PlayStatus,
        volume: f32,
        /// Gain was ramped to zero by a fade-out and must be restored on restart.
        faded_out: bool,
    },
    Bus {
        parent: Option<String>,
        gain: NodeId,
        volume: f32,
    },
}

impl Applied {
    fn parent(&self) -> Option<&str> {
        match self {
            Self::Track { parent, .. } | Self::Bus { parent, .. } => parent.as_deref(),
        }
    }

    fn gain(&self) -> NodeId {
        match self {
            Self::Track { gain, .. } | Self::Bus { gain, .. } => *gain,
        }
    }

    fn is_bus(&self) -> bool {
        matches!(self, Self::Bus { .. })
    }
}

struct ReconcileState<B> {
    backend: B,
    applied: HashMap<String, Applied>,
    master_volume: Option<f32>,
    revision: Option<u64>,
}

/// [`MixerDriver`] that keeps an [`AudioBackend`] in step with snapshots.
///
/// Passes are serialized; a snapshot older than the last applied
/// revision is skipped.
pub struct Reconciler<B> {
    state: Mutex<ReconcileState<B>>,
}

impl<B: AudioBackend> Reconciler<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: Mutex::new(ReconcileState {
                backend,
                applied: HashMap::new(),
                master_volume: None,
                revision: None,
            }),
        }
    }

    /// Ids currently backed by live resources.
    pub async fn applied_ids(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut ids: Vec<String> = state.applied.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl<B: AudioBackend + 'static> MixerDriver for Reconciler<B> {
    fn name(&self) -> &'static str {
        "reconciler"
    }

    async fn apply(&self, snapshot: MixerSnapshot) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;

        if let Some(last) = state.revision {
            if snapshot.revision < last {
                tracing::debug!(
                    revision = snapshot.revision,
                    last_applied = last,
                    "Skipping stale mixer snapshot"
                );
                return Ok(());
            }
        }

        let mut desired = Vec::new();
        flatten(&snapshot.channels, None, &mut desired);

        state.teardown_removed(&desired)?;

        for (channel, parent) in &desired {
            let destination = match parent {
                Some(parent_id) => match state.applied.get(parent_id.as_str()) {
                    Some(applied) => Destination::Node(applied.gain()),
                    None => return Err(BackendError::Closed),
                },
                None => Destination::Master,
            };
            match channel.as_ref() {
                Channel::Track(track) => {
                    state.sync_track(track, parent.clone(), destination).await?
                }
                Channel::BusTrack(bus) => {
                    state.sync_bus(&bus.id, bus.volume, parent.clone(), destination)?
                }
            }
        }

        if state.master_volume != Some(snapshot.master_volume) {
            state.backend.set_master_volume(snapshot.master_volume);
            state.master_volume = Some(snapshot.master_volume);
        }

        state.revision = Some(snapshot.revision);
        Ok(())
    }
}

impl<B: AudioBackend> ReconcileState<B> {
    /// Release resources for channels that vanished, changed kind or moved
    /// to another parent. Descendants go before their ancestors.
    fn teardown_removed(
        &mut self,
        desired: &[(Arc<Channel>, Option<String>)],
    ) -> Result<(), BackendError> {
        let wanted: HashMap<&str, (Option<&str>, bool)> = desired
            .iter()
            .map(|(channel, parent)| {
                let is_bus = matches!(channel.as_ref(), Channel::BusTrack(_));
                (channel.id(), (parent.as_deref(), is_bus))
            })
            .collect();

        let mut removed: HashSet<String> = self
            .applied
            .iter()
            .filter(|(id, applied)| match wanted.get(id.as_str()) {
                Some((parent, is_bus)) => *parent != applied.parent() || *is_bus != applied.is_bus(),
                None => true,
            })
            .map(|(id, _)| id.clone())
            .collect();

        // Anything routed through a removed bus goes with it.
        loop {
            let orphans: Vec<String> = self
                .applied
                .iter()
                .filter(|(id, applied)| {
                    !removed.contains(id.as_str())
                        && applied.parent().is_some_and(|p| removed.contains(p))
                })
                .map(|(id, _)| id.clone())
                .collect();
            if orphans.is_empty() {
                break;
            }
            removed.extend(orphans);
        }

        let mut order: Vec<(usize, String)> = removed
            .into_iter()
            .map(|id| (self.depth(&id), id))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        for (_, id) in order {
            self.teardown(&id)?;
        }
        Ok(())
    }

    fn depth(&self, id: &str) -> usize {
        let mut depth = 0;
        let mut current = self.applied.get(id).and_then(Applied::parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.applied.get(parent).and_then(Applied::parent);
        }
        depth
    }

    fn teardown(&mut self, id: &str) -> Result<(), BackendError> {
        let Some(applied) = self.applied.remove(id) else {
            return Ok(());
        };
        tracing::debug!(channel = %id, "Tearing down channel");
        match applied {
            Applied::Track {
                gain,
                player,
                status,
                ..
            } => {
                if status == PlayStatus::Playing {
                    self.backend.stop(player)?;
                }
                self.backend.release(player)?;
                self.backend.release(gain)?;
            }
            Applied::Bus { gain, .. } => self.backend.release(gain)?,
        }
        Ok(())
    }

    fn sync_bus(
        &mut self,
        id: &str,
        volume: f32,
        parent: Option<String>,
        destination: Destination,
    ) -> Result<(), BackendError> {
        match self.applied.get_mut(id) {
            Some(Applied::Bus {
                gain,
                volume: applied_volume,
                ..
            }) => {
                if *applied_volume != volume {
                    self.backend.set_volume(*gain, volume, None)?;
                    *applied_volume = volume;
                }
            }
            _ => {
                let gain = self.backend.create_gain(destination)?;
                self.backend.set_volume(gain, volume, None)?;
                tracing::debug!(channel = %id, gain, "Created bus gain");
                self.applied.insert(
                    id.to_string(),
                    Applied::Bus {
                        parent,
                        gain,
                        volume,
                    },
                );
            }
        }
        Ok(())
    }

    async fn sync_track(
        &mut self,
        track: &Track,
        parent: Option<String>,
        destination: Destination,
    ) -> Result<(), BackendError> {
        let Some(Applied::Track {
            buffer,
            gain,
            player,
            status,
            volume,
            faded_out,
            ..
        }) = self.applied.get(&track.id).cloned()
        else {
            return self.create_track(track, parent, destination).await;
        };

        let mut player = player;
        let mut faded_out = faded_out;

        if volume != track.volume && !faded_out {
            self.backend.set_volume(gain, track.volume, None)?;
        }

        match (status, track.play_status) {
            (PlayStatus::Standby, PlayStatus::Playing) => {
                self.start(gain, player, track, faded_out)?;
                faded_out = false;
            }
            (PlayStatus::Stopped, PlayStatus::Playing) => {
                // Players are one-shot; a stopped one is replaced.
                self.backend.release(player)?;
                player = self.backend.create_player(buffer, gain, track.looping)?;
                self.start(gain, player, track, faded_out)?;
                faded_out = false;
            }
            (PlayStatus::Playing, PlayStatus::Stopped | PlayStatus::Standby) => {
                match track.timing.fade_out_ms {
                    Some(fade) if fade > 0 => {
                        self.backend.set_volume(gain, 0.0, Some(fade))?;
                        tokio::time::sleep(Duration::from_millis(fade)).await;
                        faded_out = true;
                    }
                    _ => {}
                }
                self.backend.stop(player)?;
                tracing::debug!(channel = %track.id, "Stopped track");
            }
            _ => {}
        }

        self.applied.insert(
            track.id.clone(),
            Applied::Track {
                parent,
                buffer,
                gain,
                player,
                status: track.play_status,
                volume: track.volume,
                faded_out,
            },
        );
        Ok(())
    }

    async fn create_track(
        &mut self,
        track: &Track,
        parent: Option<String>,
        destination: Destination,
    ) -> Result<(), BackendError> {
        let buffer = self.backend.load(&track.src).await?;
        let gain = self.backend.create_gain(destination)?;
        self.backend.set_volume(gain, track.volume, None)?;
        let player = self.backend.create_player(buffer, gain, track.looping)?;
        tracing::debug!(channel = %track.id, src = %track.src, "Created track");

        if track.play_status == PlayStatus::Playing {
            self.start(gain, player, track, false)?;
        }

        self.applied.insert(
            track.id.clone(),
            Applied::Track {
                parent,
                buffer,
                gain,
                player,
                status: track.play_status,
                volume: track.volume,
                faded_out: false,
            },
        );
        Ok(())
    }

    fn start(
        &mut self,
        gain: NodeId,
        player: NodeId,
        track: &Track,
        faded_out: bool,
    ) -> Result<(), BackendError> {
        match track.timing.fade_in_ms {
            Some(fade) if fade > 0 => {
                self.backend.set_volume(gain, 0.0, None)?;
                self.backend.set_volume(gain, track.volume, Some(fade))?;
            }
            _ if faded_out => self.backend.set_volume(gain, track.volume, None)?,
            _ => {}
        }
        self.backend.start(
            player,
            StartOptions {
                delay_ms: track.timing.delay_ms.unwrap_or(0),
                offset_ms: track.timing.offset_ms.unwrap_or(0),
            },
        )?;
        tracing::debug!(channel = %track.id, "Started track");
        Ok(())
    }
}

/// Pre-order flattening so every parent precedes its children.
fn flatten(
    channels: &[Arc<Channel>],
    parent: Option<&str>,
    out: &mut Vec<(Arc<Channel>, Option<String>)>,
) {
    for channel in channels {
        out.push((channel.clone(), parent.map(str::to_string)));
        if let Some(children) = channel.children() {
            flatten(children, Some(channel.id()), out);
        }
    }
}
