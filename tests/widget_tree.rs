use std::sync::Arc;

use scene_engine::error::TreeError;
use scene_engine::widget::{
    add_text, add_widget, clear_text_box, find_by_id, has_id, remove_by_id, update_widget_props,
    Button, Image, Layout, Text, TextBox, WidgetKind, WidgetNode, WidgetProps, WidgetTree,
};

fn base() -> WidgetTree {
    let tree = add_widget(&[], Layout::new("root").into(), None).unwrap();
    let tree = add_widget(&tree, TextBox::new("box").into(), Some("root")).unwrap();
    let tree = add_widget(&tree, Layout::new("side").into(), Some("root")).unwrap();
    add_text(&tree, Text::new("line-1", "hello"), "box").unwrap()
}

#[test]
fn added_id_is_found_and_repeat_is_duplicate() {
    let tree = base();
    let image = Image {
        id: "portrait".to_string(),
        src: "alice.png".to_string(),
        style: Default::default(),
    };
    let with_image = add_widget(&tree, image.clone().into(), Some("side")).unwrap();
    assert!(has_id(&with_image, "portrait"));

    let err = add_widget(&with_image, image.into(), Some("side")).unwrap_err();
    assert_eq!(
        err,
        TreeError::Duplicate {
            id: "portrait".to_string()
        }
    );
}

#[test]
fn add_then_remove_round_trips() {
    let tree = base();
    let button = Button {
        id: "ok".to_string(),
        label: "OK".to_string(),
        style: Default::default(),
    };
    let added = add_widget(&tree, button.into(), Some("root")).unwrap();
    let removed = remove_by_id(&added, "ok").unwrap();
    assert_eq!(removed, tree);
}

#[test]
fn parent_must_be_layout() {
    let tree = base();
    let err = add_widget(&tree, Layout::new("inner").into(), Some("box")).unwrap_err();
    assert_eq!(err, TreeError::NotFound { id: "box".to_string() });

    let err = add_widget(&tree, Layout::new("inner").into(), Some("nowhere")).unwrap_err();
    assert_eq!(
        err,
        TreeError::NotFound {
            id: "nowhere".to_string()
        }
    );
}

#[test]
fn clear_text_box_keeps_the_box() {
    let tree = base();
    let cleared = clear_text_box(&tree, "box").unwrap();
    let text_box = find_by_id(&cleared, "box").expect("box survives");
    assert_eq!(text_box.children().map(<[_]>::len), Some(0));
    assert!(!has_id(&cleared, "line-1"));

    assert!(clear_text_box(&tree, "root").is_err());
    assert!(clear_text_box(&tree, "ghost").is_err());
}

#[test]
fn remove_drops_whole_subtree() {
    let tree = base();
    let removed = remove_by_id(&tree, "root").unwrap();
    assert!(removed.is_empty());
    assert!(remove_by_id(&removed, "root").is_err());
}

#[test]
fn untouched_siblings_are_shared() {
    let tree = add_widget(&base(), Layout::new("overlay").into(), None).unwrap();
    let updated = add_text(&tree, Text::new("line-2", "again"), "box").unwrap();
    assert!(Arc::ptr_eq(&tree[1], &updated[1]));
    assert!(!Arc::ptr_eq(&tree[0], &updated[0]));
}

#[test]
fn props_of_another_kind_are_ignored() {
    let tree = base();
    let props = WidgetProps::Button {
        label: "nope".to_string(),
    };
    assert_eq!(update_widget_props(&tree, "line-1", &props), tree);

    let props = WidgetProps::Text {
        content: "changed".to_string(),
        speed: 100,
    };
    let updated = update_widget_props(&tree, "line-1", &props);
    match find_by_id(&updated, "line-1").map(|n| n.as_ref()) {
        Some(WidgetNode::Text(text)) => assert_eq!(text.content, "changed"),
        other => panic!("Expected Text, got {:?}", other),
    }
    assert_eq!(
        find_by_id(&updated, "line-1").map(|n| n.kind()),
        Some(WidgetKind::Text)
    );
}
