use std::sync::Arc;

use scene_engine::mixer::{
    BackendError, BackendEvent, BusTrack, Channel, Destination, MemoryBackend, MixerDriver,
    MixerSnapshot, PlayStatus, Reconciler, Track,
};

fn snapshot(channels: Vec<Channel>, master_volume: f32, revision: u64) -> MixerSnapshot {
    MixerSnapshot {
        channels: channels.into_iter().map(Arc::new).collect(),
        master_volume,
        revision,
    }
}

fn scene(bgm_status: PlayStatus) -> Vec<Channel> {
    let mut bgm = Track::new("bgm", "theme.ogg");
    bgm.play_status = bgm_status;
    bgm.volume = 0.8;
    let mut music = BusTrack::new("music");
    music.volume = 0.5;
    music.children.push(Arc::new(bgm.into()));
    vec![music.into(), Track::new("click", "click.wav").into()]
}

#[tokio::test]
async fn unchanged_snapshot_applies_once() {
    let backend = MemoryBackend::new();
    let reconciler = Reconciler::new(backend.clone());

    reconciler
        .apply(snapshot(scene(PlayStatus::Playing), 0.9, 1))
        .await
        .unwrap();
    let first_pass = backend.events();

    reconciler
        .apply(snapshot(scene(PlayStatus::Playing), 0.9, 1))
        .await
        .unwrap();
    assert_eq!(backend.events(), first_pass);

    reconciler
        .apply(snapshot(scene(PlayStatus::Playing), 0.9, 2))
        .await
        .unwrap();
    assert_eq!(backend.events(), first_pass);
}

#[tokio::test]
async fn children_route_through_parent_gain() {
    let backend = MemoryBackend::new();
    let reconciler = Reconciler::new(backend.clone());
    reconciler
        .apply(snapshot(scene(PlayStatus::Standby), 1.0, 1))
        .await
        .unwrap();

    let events = backend.events();
    let gains: Vec<(u64, Destination)> = events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::GainCreated { node, destination } => Some((*node, *destination)),
            _ => None,
        })
        .collect();

    // music bus, bgm (under music), click (top level)
    assert_eq!(gains.len(), 3);
    assert_eq!(gains[0].1, Destination::Master);
    assert_eq!(gains[1].1, Destination::Node(gains[0].0));
    assert_eq!(gains[2].1, Destination::Master);
    assert!(!events
        .iter()
        .any(|e| matches!(e, BackendEvent::Started { .. })));
}

#[tokio::test]
async fn standby_to_playing_starts_existing_player() {
    let backend = MemoryBackend::new();
    let reconciler = Reconciler::new(backend.clone());
    reconciler
        .apply(snapshot(scene(PlayStatus::Standby), 1.0, 1))
        .await
        .unwrap();
    let before = backend.events().len();

    reconciler
        .apply(snapshot(scene(PlayStatus::Playing), 1.0, 2))
        .await
        .unwrap();
    let tail = backend.events()[before..].to_vec();
    assert_eq!(tail.len(), 1);
    assert!(matches!(tail[0], BackendEvent::Started { .. }));
}

#[tokio::test]
async fn restart_after_stop_uses_fresh_player() {
    let backend = MemoryBackend::new();
    let reconciler = Reconciler::new(backend.clone());
    for (revision, status) in [
        (1, PlayStatus::Playing),
        (2, PlayStatus::Stopped),
        (3, PlayStatus::Playing),
    ] {
        reconciler
            .apply(snapshot(scene(status), 1.0, revision))
            .await
            .unwrap();
    }

    let events = backend.events();
    let players = events
        .iter()
        .filter(|e| matches!(e, BackendEvent::PlayerCreated { .. }))
        .count();
    // bgm twice (initial + restart), click once
    assert_eq!(players, 3);
    let starts = events
        .iter()
        .filter(|e| matches!(e, BackendEvent::Started { .. }))
        .count();
    assert_eq!(starts, 2);
}

#[tokio::test]
async fn master_volume_set_only_on_change() {
    let backend = MemoryBackend::new();
    let reconciler = Reconciler::new(backend.clone());
    for (revision, volume) in [(1, 0.5), (2, 0.5), (3, 0.25)] {
        reconciler
            .apply(snapshot(Vec::new(), volume, revision))
            .await
            .unwrap();
    }

    let volumes: Vec<f32> = backend
        .events()
        .iter()
        .filter_map(|e| match e {
            BackendEvent::MasterVolume { volume } => Some(*volume),
            _ => None,
        })
        .collect();
    assert_eq!(volumes, vec![0.5, 0.25]);
}

#[tokio::test]
async fn failing_source_rejects_apply() {
    let backend = MemoryBackend::new();
    backend.fail_source("theme.ogg");
    let reconciler = Reconciler::new(backend.clone());

    let err = reconciler
        .apply(snapshot(scene(PlayStatus::Playing), 1.0, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::SourceUnavailable { ref src, .. } if src == "theme.ogg"));
}

#[tokio::test]
async fn concurrent_applies_converge_on_newest() {
    let backend = MemoryBackend::new();
    let reconciler = Arc::new(Reconciler::new(backend.clone()));

    let newer = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move {
            reconciler
                .apply(snapshot(vec![Track::new("b", "b.ogg").into()], 1.0, 2))
                .await
        })
    };
    newer.await.unwrap().unwrap();
    reconciler
        .apply(snapshot(vec![Track::new("a", "a.ogg").into()], 1.0, 1))
        .await
        .unwrap();

    assert_eq!(reconciler.applied_ids().await, vec!["b".to_string()]);
}
