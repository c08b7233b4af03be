//! Persistent operations over the widget forest.
//!
//! Every operation takes the forest by reference and returns a new one.
//! Only nodes on the path from a root to the edited node are rebuilt;
//! untouched subtrees are shared through their `Arc`.

use std::sync::Arc;

use crate::error::TreeError;

use super::node::{Style, Text, WidgetKind, WidgetNode, WidgetProps};

/// Ordered forest of top-level widgets.
pub type WidgetTree = Vec<Arc<WidgetNode>>;

/// Depth-first search by id, entering only container children.
pub fn find_by_id<'a>(tree: &'a [Arc<WidgetNode>], id: &str) -> Option<&'a Arc<WidgetNode>> {
    for node in tree {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = node.children().and_then(|children| find_by_id(children, id)) {
            return Some(found);
        }
    }
    None
}

pub fn has_id(tree: &[Arc<WidgetNode>], id: &str) -> bool {
    find_by_id(tree, id).is_some()
}

/// Insert `node` at top level or as the last child of the Layout `parent_layout_id`.
///
/// # Errors
/// - `Duplicate` if the node (or any node it carries) reuses an existing id
/// - `NotFound` if the parent is absent or is not a Layout
pub fn add_widget(
    tree: &[Arc<WidgetNode>],
    node: WidgetNode,
    parent_layout_id: Option<&str>,
) -> Result<WidgetTree, TreeError> {
    ensure_unique(tree, &node)?;

    match parent_layout_id {
        None => {
            let mut out = tree.to_vec();
            out.push(Arc::new(node));
            Ok(out)
        }
        Some(parent) => append_child(tree, parent, WidgetKind::Layout, node),
    }
}

/// Append a Text node to the TextBox `text_box_id`.
pub fn add_text(
    tree: &[Arc<WidgetNode>],
    text: Text,
    text_box_id: &str,
) -> Result<WidgetTree, TreeError> {
    let node = WidgetNode::Text(text);
    ensure_unique(tree, &node)?;
    append_child(tree, text_box_id, WidgetKind::TextBox, node)
}

/// Remove a node together with its whole subtree.
pub fn remove_by_id(tree: &[Arc<WidgetNode>], id: &str) -> Result<WidgetTree, TreeError> {
    edit(tree, id, &mut |_| None).ok_or_else(|| not_found(id))
}

/// Remove every child of a TextBox, keeping the TextBox itself.
pub fn clear_text_box(tree: &[Arc<WidgetNode>], id: &str) -> Result<WidgetTree, TreeError> {
    match find_by_id(tree, id) {
        Some(node) if node.kind() == WidgetKind::TextBox => {}
        _ => return Err(not_found(id)),
    }
    edit(tree, id, &mut |node| Some(Arc::new(node.with_children(Vec::new()))))
        .ok_or_else(|| not_found(id))
}

/// Replace the style of the node `id` when it is of `kind`.
///
/// An absent id or a kind mismatch leaves the tree unchanged.
pub fn update_widget_style(
    tree: &[Arc<WidgetNode>],
    id: &str,
    kind: WidgetKind,
    style: &Style,
) -> WidgetTree {
    edit(tree, id, &mut |node| {
        if node.kind() == kind {
            Some(Arc::new(node.with_style(style.clone())))
        } else {
            Some(node.clone())
        }
    })
    .unwrap_or_else(|| tree.to_vec())
}

/// Replace the type-specific props of the node `id`.
///
/// An absent id or props of another kind leave the tree unchanged.
pub fn update_widget_props(
    tree: &[Arc<WidgetNode>],
    id: &str,
    props: &WidgetProps,
) -> WidgetTree {
    edit(tree, id, &mut |node| {
        Some(node.with_props(props).map(Arc::new).unwrap_or_else(|| node.clone()))
    })
    .unwrap_or_else(|| tree.to_vec())
}

/// Mark a Text node as fully revealed. Missing ids are ignored.
pub fn mark_text_revealed(tree: &[Arc<WidgetNode>], id: &str) -> WidgetTree {
    edit(tree, id, &mut |node| match node.as_ref() {
        WidgetNode::Text(text) => Some(Arc::new(WidgetNode::Text(Text {
            revealed: true,
            ..text.clone()
        }))),
        _ => Some(node.clone()),
    })
    .unwrap_or_else(|| tree.to_vec())
}

fn ensure_unique(tree: &[Arc<WidgetNode>], node: &WidgetNode) -> Result<(), TreeError> {
    let mut ids = Vec::new();
    node.collect_ids(&mut ids);
    for (index, id) in ids.iter().enumerate() {
        if has_id(tree, id) || ids[..index].contains(id) {
            return Err(TreeError::Duplicate { id: id.to_string() });
        }
    }
    Ok(())
}

fn append_child(
    tree: &[Arc<WidgetNode>],
    parent_id: &str,
    parent_kind: WidgetKind,
    child: WidgetNode,
) -> Result<WidgetTree, TreeError> {
    match find_by_id(tree, parent_id) {
        Some(parent) if parent.kind() == parent_kind => {}
        _ => return Err(not_found(parent_id)),
    }

    let child = Arc::new(child);
    edit(tree, parent_id, &mut |parent| {
        let mut children = parent.children().unwrap_or_default().to_vec();
        children.push(child.clone());
        Some(Arc::new(parent.with_children(children)))
    })
    .ok_or_else(|| not_found(parent_id))
}

/// Rewrite the node `id` with `f` (returning `None` removes it).
///
/// Returns `None` when the id is absent.
fn edit<F>(tree: &[Arc<WidgetNode>], id: &str, f: &mut F) -> Option<WidgetTree>
where
    F: FnMut(&Arc<WidgetNode>) -> Option<Arc<WidgetNode>>,
{
    for (index, node) in tree.iter().enumerate() {
        if node.id() == id {
            let mut out = tree.to_vec();
            match f(node) {
                Some(replacement) => out[index] = replacement,
                None => {
                    out.remove(index);
                }
            }
            return Some(out);
        }

        if let Some(children) = node.children() {
            if let Some(new_children) = edit(children, id, f) {
                let mut out = tree.to_vec();
                out[index] = Arc::new(node.with_children(new_children));
                return Some(out);
            }
        }
    }
    None
}

fn not_found(id: &str) -> TreeError {
    TreeError::NotFound { id: id.to_string() }
}
