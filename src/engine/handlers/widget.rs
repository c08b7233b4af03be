use std::time::Duration;

use tracing::debug;

use crate::mvi::Command;
use crate::widget::{
    self, Button, Image, Layout, Style, Text, TextBox, WidgetKind, WidgetNode, WidgetProps,
};

use crate::engine::animation::{reveal_ttl_ms, AnimationTicket, TieBreakPolicy, INSTANT_SPEED};
use crate::engine::model::Model;
use crate::engine::reducer::{HandlerResult, Update};

/// Fields of an `AddText` message.
pub(in crate::engine) struct TextRequest {
    pub id: Option<String>,
    pub text_box_id: String,
    pub content: String,
    pub speed: Option<u8>,
    pub policy: Option<TieBreakPolicy>,
    pub style: Option<Style>,
}

pub(in crate::engine) fn add_layout(
    model: &Model,
    id: String,
    parent_layout_id: Option<String>,
    style: Option<Style>,
) -> HandlerResult {
    let node = Layout {
        id,
        style: style.unwrap_or_default(),
        children: Vec::new(),
    };
    insert(model, node.into(), parent_layout_id.as_deref())
}

pub(in crate::engine) fn add_text_box(
    model: &Model,
    id: String,
    layout_id: &str,
    style: Option<Style>,
) -> HandlerResult {
    let node = TextBox {
        id,
        style: style.unwrap_or_default(),
        children: Vec::new(),
    };
    insert(model, node.into(), Some(layout_id))
}

pub(in crate::engine) fn add_image(
    model: &Model,
    id: String,
    layout_id: &str,
    src: String,
    style: Option<Style>,
) -> HandlerResult {
    let node = Image {
        id,
        src,
        style: style.unwrap_or_default(),
    };
    insert(model, node.into(), Some(layout_id))
}

pub(in crate::engine) fn add_button(
    model: &Model,
    id: String,
    layout_id: &str,
    label: String,
    style: Option<Style>,
) -> HandlerResult {
    let node = Button {
        id,
        label,
        style: style.unwrap_or_default(),
    };
    insert(model, node.into(), Some(layout_id))
}

/// Append a Text node; below instant speed this registers a ticket and
/// schedules its completion after the reveal duration.
pub(in crate::engine) fn add_text(model: &Model, request: TextRequest) -> HandlerResult {
    let defaults = &model.config.text;
    let id = request
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let speed = request.speed.unwrap_or(defaults.default_speed).min(INSTANT_SPEED);
    let policy = request.policy.unwrap_or(defaults.default_tie_break);
    let animated = speed < INSTANT_SPEED;

    let ttl_ms = reveal_ttl_ms(&request.content, speed, defaults.char_interval_ms);
    let text = Text {
        id: id.clone(),
        content: request.content,
        speed,
        revealed: !animated,
        style: request.style.unwrap_or_default(),
    };

    let mut next = model.clone();
    next.widgets = widget::add_text(&model.widgets, text, &request.text_box_id)?;
    if !animated {
        return Ok(Update::to(next));
    }

    next.reveal_generation += 1;
    let ticket = AnimationTicket {
        id,
        generation: next.reveal_generation,
        ttl_ms,
        policy,
    };
    debug!(
        id = %ticket.id,
        generation = ticket.generation,
        ttl_ms,
        policy = ?policy,
        "Text reveal started"
    );
    let message = ticket.completion();
    next.animation_tickets.push(ticket);
    let completion = Command::new("reveal_text", async move {
        tokio::time::sleep(Duration::from_millis(ttl_ms)).await;
        message
    });
    Ok(Update::with_command(next, completion))
}

/// Remove every listed widget; any missing id aborts the whole message.
pub(in crate::engine) fn remove_widgets(model: &Model, ids: &[String]) -> HandlerResult {
    let mut next = model.clone();
    for id in ids {
        next.widgets = widget::remove_by_id(&next.widgets, id)?;
    }
    next.prune_tickets();
    Ok(Update::to(next))
}

pub(in crate::engine) fn clear_text_box(model: &Model, id: &str) -> HandlerResult {
    let mut next = model.clone();
    next.widgets = widget::clear_text_box(&model.widgets, id)?;
    next.prune_tickets();
    Ok(Update::to(next))
}

pub(in crate::engine) fn update_style(
    model: &Model,
    id: &str,
    kind: WidgetKind,
    style: &Style,
) -> Update {
    Update::to(Model {
        widgets: widget::update_widget_style(&model.widgets, id, kind, style),
        ..model.clone()
    })
}

pub(in crate::engine) fn update_props(model: &Model, id: &str, props: &WidgetProps) -> Update {
    Update::to(Model {
        widgets: widget::update_widget_props(&model.widgets, id, props),
        ..model.clone()
    })
}

/// Retire the ticket `id` issued as `generation` and mark its Text
/// revealed. Completions without a matching ticket (forced earlier, state
/// was reset, or the id now belongs to a newer reveal) are ignored.
pub(in crate::engine) fn complete_animation(model: &Model, id: &str, generation: u64) -> Update {
    if !model.has_ticket(id, generation) {
        debug!(id, generation, "Ignored completion without a pending ticket");
        return Update::to(model.clone());
    }

    let mut next = model.clone();
    next.animation_tickets
        .retain(|ticket| !(ticket.id == id && ticket.generation == generation));
    next.widgets = widget::mark_text_revealed(&model.widgets, id);
    Update::to(next)
}

fn insert(model: &Model, node: WidgetNode, parent: Option<&str>) -> HandlerResult {
    Ok(Update::to(Model {
        widgets: widget::add_widget(&model.widgets, node, parent)?,
        ..model.clone()
    }))
}
