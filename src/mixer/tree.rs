//! Persistent operations over the mixer forest.

use std::sync::Arc;

use crate::error::TreeError;

use super::channel::Channel;

/// Ordered forest of top-level channels.
pub type ChannelTree = Vec<Arc<Channel>>;

pub fn find_channel<'a>(channels: &'a [Arc<Channel>], id: &str) -> Option<&'a Arc<Channel>> {
    for channel in channels {
        if channel.id() == id {
            return Some(channel);
        }
        if let Some(found) = channel
            .children()
            .and_then(|children| find_channel(children, id))
        {
            return Some(found);
        }
    }
    None
}

pub fn has_channel(channels: &[Arc<Channel>], id: &str) -> bool {
    find_channel(channels, id).is_some()
}

/// Insert a channel at top level or as the last child of `parent_bus_track_id`.
///
/// # Errors
/// - `Duplicate` if any id carried by `channel` already exists
/// - `NotFound` if the parent is absent or is not a BusTrack
pub fn add_channel(
    channels: &[Arc<Channel>],
    channel: Channel,
    parent_bus_track_id: Option<&str>,
) -> Result<ChannelTree, TreeError> {
    let mut ids = Vec::new();
    channel.collect_ids(&mut ids);
    for (index, id) in ids.iter().enumerate() {
        if has_channel(channels, id) || ids[..index].contains(id) {
            return Err(TreeError::Duplicate { id: id.to_string() });
        }
    }

    let Some(parent_id) = parent_bus_track_id else {
        let mut out = channels.to_vec();
        out.push(Arc::new(channel));
        return Ok(out);
    };

    match find_channel(channels, parent_id) {
        Some(parent) if matches!(parent.as_ref(), Channel::BusTrack(_)) => {}
        _ => {
            return Err(TreeError::NotFound {
                id: parent_id.to_string(),
            })
        }
    }

    let channel = Arc::new(channel);
    edit(channels, parent_id, &mut |parent| {
        let mut children = parent.children().unwrap_or_default().to_vec();
        children.push(channel.clone());
        Some(Arc::new(parent.with_children(children)))
    })
    .ok_or_else(|| TreeError::NotFound {
        id: parent_id.to_string(),
    })
}

/// Remove a channel and, for a BusTrack, everything routed through it.
pub fn remove_channel(channels: &[Arc<Channel>], id: &str) -> Result<ChannelTree, TreeError> {
    edit(channels, id, &mut |_| None).ok_or_else(|| TreeError::NotFound { id: id.to_string() })
}

/// Replace the channel `id` with `f(channel)`.
pub fn update_channel<F>(
    channels: &[Arc<Channel>],
    id: &str,
    f: F,
) -> Result<ChannelTree, TreeError>
where
    F: Fn(&Channel) -> Channel,
{
    edit(channels, id, &mut |channel| Some(Arc::new(f(channel))))
        .ok_or_else(|| TreeError::NotFound { id: id.to_string() })
}

/// Apply `f` to every channel, children first, rebuilding each BusTrack
/// from its mapped children before `f` sees it.
pub fn map_channels<F>(channels: &[Arc<Channel>], f: &F) -> ChannelTree
where
    F: Fn(&Channel) -> Channel,
{
    channels
        .iter()
        .map(|channel| {
            let rebuilt = match channel.children() {
                Some(children) => channel.with_children(map_channels(children, f)),
                None => Channel::clone(channel),
            };
            Arc::new(f(&rebuilt))
        })
        .collect()
}

/// Keep only channels matching `keep`; a dropped BusTrack drops its subtree.
/// Surviving BusTracks are rebuilt from their filtered children.
pub fn filter_channels<F>(channels: &[Arc<Channel>], keep: &F) -> ChannelTree
where
    F: Fn(&Channel) -> bool,
{
    channels
        .iter()
        .filter(|channel| keep(channel))
        .map(|channel| match channel.children() {
            Some(children) => Arc::new(channel.with_children(filter_channels(children, keep))),
            None => channel.clone(),
        })
        .collect()
}

fn edit<F>(channels: &[Arc<Channel>], id: &str, f: &mut F) -> Option<ChannelTree>
where
    F: FnMut(&Arc<Channel>) -> Option<Arc<Channel>>,
{
    for (index, channel) in channels.iter().enumerate() {
        if channel.id() == id {
            let mut out = channels.to_vec();
            match f(channel) {
                Some(replacement) => out[index] = replacement,
                None => {
                    out.remove(index);
                }
            }
            return Some(out);
        }

        if let Some(children) = channel.children() {
            if let Some(new_children) = edit(children, id, f) {
                let mut out = channels.to_vec();
                out[index] = Arc::new(channel.with_children(new_children));
                return Some(out);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::channel::{BusTrack, Track};

    #[test]
    fn map_sees_rebuilt_children() {
        let tree = add_channel(&[], BusTrack::new("music").into(), None).unwrap();
        let tree = add_channel(&tree, Track::new("bgm", "a.ogg").into(), Some("music")).unwrap();

        let halved = map_channels(&tree, &|c: &Channel| c.with_volume(c.volume() / 2.0));
        let bus = find_channel(&halved, "music").unwrap();
        let track = find_channel(&halved, "bgm").unwrap();
        assert_eq!(bus.volume(), 0.5);
        assert_eq!(track.volume(), 0.5);
        // The bus carries the mapped child, not the original.
        assert_eq!(bus.children().unwrap()[0].volume(), 0.5);
    }

    #[test]
    fn filter_drops_subtree_of_removed_bus() {
        let tree = add_channel(&[], BusTrack::new("sfx").into(), None).unwrap();
        let tree = add_channel(&tree, Track::new("click", "c.ogg").into(), Some("sfx")).unwrap();
        let tree = add_channel(&tree, Track::new("bgm", "a.ogg").into(), None).unwrap();

        let kept = filter_channels(&tree, &|c: &Channel| c.id() != "sfx");
        assert!(!has_channel(&kept, "sfx"));
        assert!(!has_channel(&kept, "click"));
        assert!(has_channel(&kept, "bgm"));
    }

    #[test]
    fn track_cannot_be_parent() {
        let tree = add_channel(&[], Track::new("bgm", "a.ogg").into(), None).unwrap();
        let err = add_channel(&tree, Track::new("voice", "v.ogg").into(), Some("bgm")).unwrap_err();
        assert_eq!(
            err,
            TreeError::NotFound {
                id: "bgm".to_string()
            }
        );
    }
}
