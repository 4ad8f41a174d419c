//! Per-session navigation state owned by the session engine

use std::collections::HashMap;

use super::types::Playlist;

/// Playlists of the channel whose playlist screen was shown last
#[derive(Clone, Debug)]
pub struct PlaylistBuffer {
    pub channel_id: String,
    pub playlists: HashMap<String, Playlist>,
}

#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub current_channel: Option<String>,
    pub playlist_buffer: Option<PlaylistBuffer>,
}

impl SessionState {
    pub fn remember_channel(&mut self, channel_id: &str) {
        self.current_channel = Some(channel_id.to_string());
    }

    /// Replace the buffer; only one channel is ever retained
    pub fn buffer_playlists(&mut self, channel_id: &str, playlists: HashMap<String, Playlist>) {
        self.playlist_buffer = Some(PlaylistBuffer {
            channel_id: channel_id.to_string(),
            playlists,
        });
    }

    /// A playlist from the buffer, if the buffer belongs to the current channel
    pub fn buffered_playlist(&self, playlist_id: &str) -> Option<&Playlist> {
        let buffer = self.playlist_buffer.as_ref()?;
        if self.current_channel.as_deref() != Some(buffer.channel_id.as_str()) {
            return None;
        }
        buffer.playlists.get(playlist_id)
    }
}
