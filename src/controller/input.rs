//! Event decoding and dispatch

use anyhow::Result;
use serde::Deserialize;
use tokio::io::AsyncWrite;

use crate::model::Selection;
use crate::view::menu;

use super::{Flow, SessionEngine};

/// The only event name that changes anything
pub const SELECT_ENTRY: &str = "select entry";

/// One event from the launcher
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputEvent {
    pub name: String,
    pub value: String,
    pub data: String,
}

/// What the selected row's text asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Videos,
    Playlists,
    UpdateVideos,
    UpdatePlaylists,
    Back,
    Select,
}

impl Action {
    fn from_value(value: &str) -> Self {
        match value {
            menu::VIDEOS => Self::Videos,
            menu::PLAYLISTS => Self::Playlists,
            menu::UPDATE_VIDEOS => Self::UpdateVideos,
            menu::UPDATE_PLAYLISTS => Self::UpdatePlaylists,
            menu::BACK => Self::Back,
            _ => Self::Select,
        }
    }
}

impl SessionEngine {
    /// Apply one event and emit the resulting screen
    pub(crate) async fn handle_event<W>(&mut self, event: &InputEvent, output: &mut W) -> Result<Flow>
    where
        W: AsyncWrite + Unpin,
    {
        if event.name != SELECT_ENTRY {
            tracing::trace!(name = %event.name, "Ignoring event");
            self.emit(output).await?;
            return Ok(Flow::Continue);
        }

        let selection = Selection::parse(&event.data);
        if let Selection::Channel(id) = &selection {
            self.state.remember_channel(id);
        }

        let action = Action::from_value(&event.value);
        let mut flow = Flow::Continue;
        match (action, &selection) {
            (Action::Videos, Selection::Channel(id)) => self.show_uploads(id).await,
            (Action::Playlists, Selection::Channel(id)) => self.show_playlists(id).await,
            (Action::UpdateVideos, Selection::Channel(id)) => self.update_uploads(id, output).await?,
            (Action::UpdatePlaylists, Selection::Channel(id)) => {
                self.update_playlists(id, output).await?
            }
            // Channel actions only ever carry a channel ID; anything else
            // leaves the screen as it was
            (Action::Videos | Action::Playlists | Action::UpdateVideos | Action::UpdatePlaylists, _) => {
                tracing::warn!(value = %event.value, data = %event.data, "Channel action without a channel id");
            }
            (Action::Back, _) => match &selection {
                Selection::ChannelMenu(id) => self.show_channel_menu(id),
                _ => self.show_channels(menu::CHANNELS_MESSAGE).await,
            },
            (Action::Select, _) => match &selection {
                Selection::Playlist(id) => self.show_playlist_videos(id).await,
                Selection::Video(id) => flow = self.play_video(id),
                other => self.show_channel_menu(other.as_str()),
            },
        }

        self.emit(output).await?;
        Ok(flow)
    }
}
