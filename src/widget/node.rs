//! Presentational widget node types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form style properties (CSS-like key/value bag).
pub type Style = Map<String, Value>;

/// A node in the presentational tree.
///
/// Containers hold their children behind `Arc` so that an edit only
/// rebuilds the nodes on the path to the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WidgetNode {
    Layout(Layout),
    TextBox(TextBox),
    Image(Image),
    Text(Text),
    Button(Button),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub id: String,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub children: Vec<Arc<WidgetNode>>,
}

/// Container whose children are restricted to `Text` nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub id: String,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub children: Vec<Arc<WidgetNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub src: String,
    #[serde(default)]
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub id: String,
    pub content: String,
    /// Reveal speed, 0..=100. 100 renders instantly.
    pub speed: u8,
    /// False while a timed reveal is still running.
    #[serde(default)]
    pub revealed: bool,
    #[serde(default)]
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub style: Style,
}

/// Variant tag of a [`WidgetNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    Layout,
    TextBox,
    Image,
    Text,
    Button,
}

/// Type-specific properties replaced by `UpdateWidgetProps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WidgetProps {
    Image { src: String },
    Text { content: String, speed: u8 },
    Button { label: String },
}

impl WidgetProps {
    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Image { .. } => WidgetKind::Image,
            Self::Text { .. } => WidgetKind::Text,
            Self::Button { .. } => WidgetKind::Button,
        }
    }
}

impl WidgetNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Layout(n) => &n.id,
            Self::TextBox(n) => &n.id,
            Self::Image(n) => &n.id,
            Self::Text(n) => &n.id,
            Self::Button(n) => &n.id,
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Layout(_) => WidgetKind::Layout,
            Self::TextBox(_) => WidgetKind::TextBox,
            Self::Image(_) => WidgetKind::Image,
            Self::Text(_) => WidgetKind::Text,
            Self::Button(_) => WidgetKind::Button,
        }
    }

    pub fn style(&self) -> &Style {
        match self {
            Self::Layout(n) => &n.style,
            Self::TextBox(n) => &n.style,
            Self::Image(n) => &n.style,
            Self::Text(n) => &n.style,
            Self::Button(n) => &n.style,
        }
    }

    /// Children of a container; `None` for leaves.
    pub fn children(&self) -> Option<&[Arc<WidgetNode>]> {
        match self {
            Self::Layout(n) => Some(&n.children),
            Self::TextBox(n) => Some(&n.children),
            _ => None,
        }
    }

    /// Copy of this node with its children replaced. Leaves are returned unchanged.
    pub fn with_children(&self, children: Vec<Arc<WidgetNode>>) -> WidgetNode {
        match self {
            Self::Layout(n) => Self::Layout(Layout {
                children,
                ..n.clone()
            }),
            Self::TextBox(n) => Self::TextBox(TextBox {
                children,
                ..n.clone()
            }),
            other => other.clone(),
        }
    }

    /// Copy of this node with its style replaced.
    pub fn with_style(&self, style: Style) -> WidgetNode {
        let mut node = self.clone();
        match &mut node {
            Self::Layout(n) => n.style = style,
            Self::TextBox(n) => n.style = style,
            Self::Image(n) => n.style = style,
            Self::Text(n) => n.style = style,
            Self::Button(n) => n.style = style,
        }
        node
    }

    /// Copy of this node with type-specific props applied, or `None` when
    /// the props belong to a different kind.
    pub fn with_props(&self, props: &WidgetProps) -> Option<WidgetNode> {
        match (self, props) {
            (Self::Image(n), WidgetProps::Image { src }) => Some(Self::Image(Image {
                src: src.clone(),
                ..n.clone()
            })),
            (Self::Text(n), WidgetProps::Text { content, speed }) => Some(Self::Text(Text {
                content: content.clone(),
                speed: *speed,
                ..n.clone()
            })),
            (Self::Button(n), WidgetProps::Button { label }) => Some(Self::Button(Button {
                label: label.clone(),
                ..n.clone()
            })),
            _ => None,
        }
    }

    /// Ids of this node and every descendant, depth-first.
    pub fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.id());
        if let Some(children) = self.children() {
            for child in children {
                child.collect_ids(out);
            }
        }
    }
}

impl From<Layout> for WidgetNode {
    fn from(node: Layout) -> Self {
        Self::Layout(node)
    }
}

impl From<TextBox> for WidgetNode {
    fn from(node: TextBox) -> Self {
        Self::TextBox(node)
    }
}

impl From<Image> for WidgetNode {
    fn from(node: Image) -> Self {
        Self::Image(node)
    }
}

impl From<Text> for WidgetNode {
    fn from(node: Text) -> Self {
        Self::Text(node)
    }
}

impl From<Button> for WidgetNode {
    fn from(node: Button) -> Self {
        Self::Button(node)
    }
}

impl Layout {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            style: Style::new(),
            children: Vec::new(),
        }
    }
}

impl TextBox {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            style: Style::new(),
            children: Vec::new(),
        }
    }
}

impl Text {
    /// Fully revealed text.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            speed: crate::engine::INSTANT_SPEED,
            revealed: true,
            style: Style::new(),
        }
    }
}
