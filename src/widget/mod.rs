//! Presentational widget tree.
//!
//! An ordered forest of Layout, TextBox, Image, Text and Button nodes.
//! Ids are unique across the whole forest; uniqueness is checked before
//! every insertion.

mod node;
mod tree;

pub use node::{Button, Image, Layout, Style, Text, TextBox, WidgetKind, WidgetNode, WidgetProps};
pub use tree::{
    add_text, add_widget, clear_text_box, find_by_id, has_id, mark_text_revealed, remove_by_id,
    update_widget_props, update_widget_style, WidgetTree,
};
