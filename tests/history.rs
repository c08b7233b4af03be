mod common;

use scene_engine::config::EngineConfig;
use scene_engine::engine::{Message, Store, TieBreakPolicy};
use scene_engine::error::{ErrorKind, SceneError};
use serde_json::json;

use common::{custom_state, dispatch_all, noop_store, stage, text};

fn capped(caps: &[(&str, usize)]) -> EngineConfig {
    let mut config = EngineConfig::default();
    for (kind, cap) in caps {
        config.history.caps.insert(kind.to_string(), *cap);
    }
    config
}

fn store_with(config: EngineConfig) -> Store {
    let mut store = noop_store();
    store.dispatch(Message::UpdateConfig { config });
    store
}

#[test]
fn window_keeps_most_recent_per_kind() {
    let mut store = store_with(capped(&[("PutCustomState", 3)]));
    dispatch_all(&mut store, (1..=4).map(|n| custom_state(json!(n))));

    let history = &store.model().history;
    assert_eq!(
        history.get("PutCustomState"),
        vec![
            &custom_state(json!(2)),
            &custom_state(json!(3)),
            &custom_state(json!(4))
        ]
    );
    // Default caps leave uncapped kinds unrecorded.
    assert_eq!(history.len("UpdateConfig"), 0);
}

#[test]
fn failed_and_gated_messages_are_not_recorded() {
    let mut store = store_with(capped(&[("AddTextBox", 5), ("PutCustomState", 5)]));
    dispatch_all(&mut store, stage());
    assert_eq!(store.model().history.len("AddTextBox"), 1);

    // Duplicate id: the handler fails and the Model is untouched.
    store.dispatch(Message::AddTextBox {
        id: "box".to_string(),
        layout_id: "root".to_string(),
        style: None,
    });
    assert_eq!(store.model().history.len("AddTextBox"), 1);

    store.dispatch(Message::Error {
        error: SceneError::new(ErrorKind::Other("Halt".to_string()), "halt"),
    });
    store.dispatch(custom_state(json!("dropped")));
    assert_eq!(store.model().history.len("PutCustomState"), 0);
    assert_eq!(store.model().custom_state, None);
}

#[tokio::test(start_paused = true)]
async fn redirected_advance_is_recorded_once() {
    let mut store = store_with(capped(&[("Next", 5)]));
    dispatch_all(&mut store, stage());
    store.dispatch(text("t1", "abc", 0, TieBreakPolicy::Insert));

    store.dispatch(Message::next(custom_state(json!("go"))));
    assert_eq!(store.model().index, 1);
    assert_eq!(store.model().history.len("Next"), 1);
}

#[test]
fn update_config_retrims_existing_lists() {
    let mut store = store_with(capped(&[("PutCustomState", 10)]));
    dispatch_all(&mut store, (1..=6).map(|n| custom_state(json!(n))));
    assert_eq!(store.model().history.len("PutCustomState"), 6);

    store.dispatch(Message::UpdateConfig {
        config: capped(&[("PutCustomState", 2)]),
    });
    assert_eq!(
        store.model().history.get("PutCustomState"),
        vec![&custom_state(json!(5)), &custom_state(json!(6))]
    );
}

#[test]
fn disabled_history_records_nothing() {
    let mut config = capped(&[("PutCustomState", 10)]);
    config.features.history = false;
    let mut store = store_with(config);
    dispatch_all(&mut store, (1..=3).map(|n| custom_state(json!(n))));
    assert!(store.model().history.is_empty());
}
