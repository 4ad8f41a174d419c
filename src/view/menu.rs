//! Entity lists to menu screens.
//!
//! Channels and playlists come out of hash maps, so they are sorted by title
//! here; video lists keep the provider's order.

use std::collections::HashMap;

use crate::model::{Channel, Playlist, Selection, Video};

use super::{Line, Screen};

pub const BACK: &str = "back";
pub const VIDEOS: &str = "videos";
pub const PLAYLISTS: &str = "playlists";
pub const UPDATE_VIDEOS: &str = "update videos";
pub const UPDATE_PLAYLISTS: &str = "update playlists";

const CHANNEL_ACTIONS: [&str; 5] = [BACK, VIDEOS, PLAYLISTS, UPDATE_VIDEOS, UPDATE_PLAYLISTS];

pub const CHANNELS_MESSAGE: &str = "channels list";
pub const CHOOSE_ACTION_MESSAGE: &str = "choose action";

pub fn channels(channels: &HashMap<String, Channel>) -> Screen {
    let mut sorted: Vec<&Channel> = channels.values().collect();
    sorted.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));

    let lines = sorted
        .into_iter()
        .map(|c| Line::new(&c.title, &c.id).with_icon(c.thumbnail_path.as_deref()))
        .collect();
    Screen::new(lines, CHANNELS_MESSAGE)
}

/// The fixed actions for one channel; each row carries the channel ID
pub fn channel_menu(channel_id: &str, channel_title: &str) -> Screen {
    let lines = CHANNEL_ACTIONS
        .iter()
        .map(|action| Line::new(*action, channel_id))
        .collect();
    Screen::new(lines, format!("{channel_title}: {CHOOSE_ACTION_MESSAGE}"))
}

/// Rows for every video a viewer can open; private videos are dropped
pub fn video_lines(videos: &[Video]) -> Vec<Line> {
    videos
        .iter()
        .filter(|v| !v.is_private())
        .map(|v| Line::new(&v.title, &v.id).with_icon(v.thumbnail_path.as_deref()))
        .collect()
}

/// `back` row returning to a channel's action menu, or to the channel list
/// when no channel is known
fn back_line(channel_id: Option<&str>) -> Line {
    Line::new(BACK, channel_id.map(Selection::channel_key).unwrap_or_default())
}

/// Videos of `source`; the count in the message is the number of listed videos
pub fn videos(channel_id: Option<&str>, source: &str, videos: &[Video]) -> Screen {
    let rows = video_lines(videos);
    let message = format!("last {} videos of {}", rows.len(), source);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(back_line(channel_id));
    lines.extend(rows);
    Screen::new(lines, message)
}

pub fn playlists(channel_id: &str, channel_title: &str, playlists: &HashMap<String, Playlist>) -> Screen {
    let mut sorted: Vec<&Playlist> = playlists.values().collect();
    sorted.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));

    let mut lines = Vec::with_capacity(sorted.len() + 1);
    lines.push(back_line(Some(channel_id)));
    lines.extend(
        sorted
            .into_iter()
            .map(|p| Line::new(&p.title, &p.id).with_icon(p.thumbnail_path.as_deref())),
    );
    Screen::new(lines, format!("last {} playlists of {}", playlists.len(), channel_title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fake;
    use std::path::PathBuf;

    #[test]
    fn channels_render_one_line_each_with_icon() {
        let mut first = fake::channel(1, "Zeta");
        first.thumbnail_path = Some(PathBuf::from("/cache/thumbnails/default1.jpg"));
        let second = fake::channel(2, "Alpha");
        let map = HashMap::from([(first.id.clone(), first.clone()), (second.id.clone(), second.clone())]);

        let screen = channels(&map);

        assert_eq!(screen.message, CHANNELS_MESSAGE);
        assert_eq!(screen.lines.len(), 2);
        assert_eq!(screen.lines[0], Line::new("Alpha", &second.id));
        assert_eq!(screen.lines[1].data, first.id);
        assert_eq!(screen.lines[1].icon.as_deref(), Some("/cache/thumbnails/default1.jpg"));
    }

    #[test]
    fn channel_menu_has_five_actions_carrying_the_id() {
        let id = fake::channel_id(1);
        let screen = channel_menu(&id, "First");

        let texts: Vec<&str> = screen.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["back", "videos", "playlists", "update videos", "update playlists"]);
        assert!(screen.lines.iter().all(|l| l.data == id));
        assert_eq!(screen.message, "First: choose action");
    }

    #[test]
    fn private_videos_are_excluded_and_not_counted() {
        let id = fake::channel_id(1);
        let list = vec![
            fake::video(1, "One"),
            fake::video(2, "Private video"),
            fake::video(3, "Three"),
        ];

        let screen = videos(Some(&id), "First", &list);

        assert_eq!(screen.lines.len(), 3);
        assert_eq!(screen.lines[0], Line::new("back", format!("channel:{id}")));
        assert!(screen.lines.iter().all(|l| l.text != "Private video"));
        assert_eq!(screen.message, "last 2 videos of First");
        assert_eq!(screen.lines.len() - 1, 2);
    }

    #[test]
    fn video_screen_without_channel_goes_back_to_channel_list() {
        let screen = videos(None, "Mix", &[]);
        assert_eq!(screen.lines, vec![Line::new("back", "")]);
        assert_eq!(screen.message, "last 0 videos of Mix");
    }

    #[test]
    fn playlists_render_behind_a_back_line() {
        let id = fake::channel_id(1);
        let a = fake::playlist(1, "Tutorials", vec![]);
        let b = fake::playlist(2, "Live", vec![]);
        let map = HashMap::from([(a.id.clone(), a.clone()), (b.id.clone(), b.clone())]);

        let screen = playlists(&id, "First", &map);

        assert_eq!(screen.lines[0].data, format!("channel:{id}"));
        let rows: Vec<&str> = screen.lines[1..].iter().map(|l| l.data.as_str()).collect();
        assert_eq!(rows, [b.id.as_str(), a.id.as_str()]);
        assert_eq!(screen.message, "last 2 playlists of First");
    }

    #[test]
    fn screen_serializes_with_empty_input() {
        let screen = Screen::new(vec![Line::new("back", "")], "hi");
        let json = serde_json::to_string(&screen).unwrap();
        assert_eq!(json, r#"{"lines":[{"text":"back","data":""}],"message":"hi","input":""}"#);
    }
}
