//! Screens backed by the cache store

use anyhow::Result;
use tokio::io::AsyncWrite;

use crate::view::menu;

use super::SessionEngine;

impl SessionEngine {
    pub(crate) async fn show_channels(&mut self, message: &str) {
        // Loaded once; a failed load is retried on the next visit
        if self.channels.is_empty() {
            match self.store.read_channels().await {
                Ok(channels) => self.channels = channels,
                Err(e) => {
                    tracing::error!(error = %e, "Can't read channels");
                    self.screen.message = "channels not ready".to_string();
                    return;
                }
            }
        }

        self.screen = menu::channels(&self.channels);
        self.screen.message = message.to_string();
    }

    pub(crate) fn show_channel_menu(&mut self, channel_id: &str) {
        let title = self.channel_title(channel_id);
        self.screen = menu::channel_menu(channel_id, &title);
    }

    pub(crate) async fn show_uploads(&mut self, channel_id: &str) {
        let title = self.channel_title(channel_id);
        match self.store.read_uploads(channel_id, false).await {
            Ok(videos) => {
                tracing::info!(channel_id, count = videos.len(), "Showing uploads");
                self.screen = menu::videos(Some(channel_id), &title, &videos);
            }
            Err(e) => {
                tracing::error!(channel_id, error = %e, "Can't read uploads");
                self.screen.message = format!("videos for {title} not ready");
            }
        }
    }

    pub(crate) async fn show_playlists(&mut self, channel_id: &str) {
        let title = self.channel_title(channel_id);
        match self.store.read_all_playlists(channel_id, false).await {
            Ok(playlists) => {
                tracing::info!(channel_id, count = playlists.len(), "Showing playlists");
                self.screen = menu::playlists(channel_id, &title, &playlists);
                self.state.buffer_playlists(channel_id, playlists);
            }
            Err(e) => {
                tracing::error!(channel_id, error = %e, "Can't read playlists");
                self.screen.message = format!("playlists for {title} not ready");
            }
        }
    }

    /// Videos of a playlist: from the buffer when it belongs to the current
    /// channel, else from the channel's cached playlists, else from the
    /// playlist's own cache file
    pub(crate) async fn show_playlist_videos(&mut self, playlist_id: &str) {
        let channel_id = self.state.current_channel.clone();

        if let Some(playlist) = self.state.buffered_playlist(playlist_id) {
            tracing::debug!(playlist_id, "Playlist served from buffer");
            let source = format!("{} playlist", playlist.title);
            self.screen = menu::videos(channel_id.as_deref(), &source, &playlist.videos);
            return;
        }

        // Buffer missed: reload the current channel's playlists and rebuffer
        if let Some(channel_id) = channel_id.as_deref() {
            match self.store.read_all_playlists(channel_id, false).await {
                Ok(playlists) => {
                    let found = playlists.get(playlist_id).map(|playlist| {
                        let source = format!("{} playlist", playlist.title);
                        menu::videos(Some(channel_id), &source, &playlist.videos)
                    });
                    self.state.buffer_playlists(channel_id, playlists);
                    if let Some(screen) = found {
                        self.screen = screen;
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(channel_id, playlist_id, error = %e, "Can't read channel playlists");
                }
            }
        }

        // Last resort: the playlist on its own, without a title
        match self.store.read_playlist(playlist_id).await {
            Ok(videos) => {
                let source = format!("{playlist_id} playlist");
                self.screen = menu::videos(channel_id.as_deref(), &source, &videos);
            }
            Err(e) => {
                tracing::error!(playlist_id, error = %e, "Can't read playlist videos");
                self.screen.message = "get playlist videos error".to_string();
            }
        }
    }

    pub(crate) async fn update_uploads<W>(&mut self, channel_id: &str, output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let title = self.channel_title(channel_id);
        let progress = format!("updating videos for {title}...");
        // Interim screen while the provider is queried
        self.screen.message = progress.clone();
        self.emit(output).await?;

        let outcome = match self.store.read_uploads(channel_id, true).await {
            Ok(videos) => {
                tracing::info!(channel_id, count = videos.len(), "Uploads updated");
                "done"
            }
            Err(e) => {
                tracing::error!(channel_id, error = %e, "Uploads update failed");
                "error"
            }
        };

        self.show_channel_menu(channel_id);
        self.screen.message = format!("{progress}{outcome}");
        Ok(())
    }

    pub(crate) async fn update_playlists<W>(&mut self, channel_id: &str, output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let title = self.channel_title(channel_id);
        let progress = format!("updating playlists for {title}...");
        self.screen.message = progress.clone();
        self.emit(output).await?;

        let outcome = match self.store.read_all_playlists(channel_id, true).await {
            Ok(playlists) => {
                tracing::info!(channel_id, count = playlists.len(), "Playlists updated");
                self.state.buffer_playlists(channel_id, playlists);
                "done"
            }
            Err(e) => {
                tracing::error!(channel_id, error = %e, "Playlists update failed");
                "error"
            }
        };

        self.show_channel_menu(channel_id);
        self.screen.message = format!("{progress}{outcome}");
        Ok(())
    }
}
