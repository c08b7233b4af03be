//! Declarative audio channel types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Playback state requested for a Track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayStatus {
    #[default]
    Standby,
    Playing,
    Stopped,
}

/// Loop bounds in milliseconds. `end_ms: None` loops to the end of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopRange {
    pub start_ms: u64,
    #[serde(default)]
    pub end_ms: Option<u64>,
}

/// Optional timings attached by PlayChannel / StopChannel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default)]
    pub fade_in_ms: Option<u64>,
    #[serde(default)]
    pub fade_out_ms: Option<u64>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub offset_ms: Option<u64>,
}

/// Leaf channel playing one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(default)]
    pub play_status: PlayStatus,
    pub volume: f32,
    pub src: String,
    #[serde(default, rename = "loop")]
    pub looping: Option<LoopRange>,
    #[serde(default)]
    pub timing: Timing,
}

/// Routing channel whose gain applies to all of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusTrack {
    pub id: String,
    pub volume: f32,
    #[serde(default)]
    pub children: Vec<Arc<Channel>>,
}

/// A node in the mixing graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Channel {
    Track(Track),
    BusTrack(BusTrack),
}

impl Channel {
    pub fn id(&self) -> &str {
        match self {
            Self::Track(t) => &t.id,
            Self::BusTrack(b) => &b.id,
        }
    }

    pub fn volume(&self) -> f32 {
        match self {
            Self::Track(t) => t.volume,
            Self::BusTrack(b) => b.volume,
        }
    }

    pub fn as_track(&self) -> Option<&Track> {
        match self {
            Self::Track(t) => Some(t),
            Self::BusTrack(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Arc<Channel>]> {
        match self {
            Self::Track(_) => None,
            Self::BusTrack(b) => Some(&b.children),
        }
    }

    /// Copy with children replaced. Tracks are returned unchanged.
    pub fn with_children(&self, children: Vec<Arc<Channel>>) -> Channel {
        match self {
            Self::BusTrack(b) => Self::BusTrack(BusTrack {
                children,
                ..b.clone()
            }),
            track => track.clone(),
        }
    }

    pub fn with_volume(&self, volume: f32) -> Channel {
        match self {
            Self::Track(t) => Self::Track(Track {
                volume,
                ..t.clone()
            }),
            Self::BusTrack(b) => Self::BusTrack(BusTrack {
                volume,
                ..b.clone()
            }),
        }
    }

    pub fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.id());
        if let Some(children) = self.children() {
            for child in children {
                child.collect_ids(out);
            }
        }
    }
}

impl From<Track> for Channel {
    fn from(track: Track) -> Self {
        Self::Track(track)
    }
}

impl From<BusTrack> for Channel {
    fn from(bus: BusTrack) -> Self {
        Self::BusTrack(bus)
    }
}

impl Track {
    pub fn new(id: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            play_status: PlayStatus::Standby,
            volume: 1.0,
            src: src.into(),
            looping: None,
            timing: Timing::default(),
        }
    }
}

impl BusTrack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            volume: 1.0,
            children: Vec::new(),
        }
    }
}

/// Full declarative mixer state handed to a `MixerDriver`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixerSnapshot {
    pub channels: Vec<Arc<Channel>>,
    pub master_volume: f32,
    /// Monotonic counter; drivers drop snapshots older than the last applied one.
    pub revision: u64,
}
