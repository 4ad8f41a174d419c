//! YouTube Data API client behind the [`ContentProvider`] seam

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::types::{Channel, Playlist, Thumbnails, Video};

const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Largest page the Data API hands out for list requests
pub const MAX_PAGE_SIZE: u32 = 50;

/// Remote source of channel, playlist and video metadata.
///
/// Returned entities carry provider thumbnails only; local thumbnail paths are
/// assigned by the cache.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn get_channels(&self, ids: &[String]) -> Result<Vec<Channel>>;

    /// Videos of the channel's uploads playlist
    async fn get_uploads(&self, channel_id: &str) -> Result<Vec<Video>>;

    async fn get_videos(&self, playlist_id: &str) -> Result<Vec<Video>>;

    /// Playlists of a channel, each with its own videos
    async fn get_playlists(&self, channel_id: &str) -> Result<Vec<Playlist>>;
}

#[derive(Clone, Debug)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    max_results: u32,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Snippet {
    title: String,
    thumbnails: Thumbnails,
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistResource {
    id: String,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    snippet: Snippet,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, max_results: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            max_results: max_results.clamp(1, MAX_PAGE_SIZE),
            base_url: API_BASE_URL.to_string(),
        })
    }

    async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        crate::log_api_request!(resource, ?params);
        let result = self.fetch_list(resource, params).await;
        crate::log_api_result!(resource, result);
        result
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, resource);
        let max_results = self.max_results.to_string();
        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("maxResults", max_results.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("{resource} request failed"))?;

        // Quota and key errors come back as JSON bodies; keep them in the error
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("{resource} request failed with {status}: {body}");
        }

        let list: ListResponse<T> = response
            .json()
            .await
            .with_context(|| format!("{resource} response could not be decoded"))?;
        Ok(list.items)
    }

    /// Resolve the ID of the playlist holding a channel's uploads
    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String> {
        let items: Vec<ChannelItem> = self
            .list("channels", &[("part", "contentDetails"), ("id", channel_id)])
            .await?;

        items
            .into_iter()
            .filter_map(|item| item.content_details)
            .filter_map(|details| details.related_playlists)
            .find_map(|related| related.uploads.filter(|id| !id.is_empty()))
            .ok_or_else(|| anyhow!("no uploads playlist for channel {channel_id}"))
    }
}

fn to_video(item: PlaylistItem) -> Option<Video> {
    let Snippet {
        title,
        thumbnails,
        resource_id,
    } = item.snippet;
    // Items without a video ID (deleted entries) are dropped
    let id = resource_id.and_then(|r| r.video_id)?;
    Some(Video {
        id,
        title,
        thumbnails,
        thumbnail_path: None,
    })
}

#[async_trait]
impl ContentProvider for YouTubeClient {
    async fn get_channels(&self, ids: &[String]) -> Result<Vec<Channel>> {
        let joined = ids.join(",");
        let items: Vec<ChannelItem> = self
            .list("channels", &[("part", "snippet"), ("id", joined.as_str())])
            .await?;

        if items.is_empty() {
            bail!("channels request returned no channels");
        }

        Ok(items
            .into_iter()
            .map(|item| Channel {
                id: item.id,
                title: item.snippet.title,
                thumbnails: item.snippet.thumbnails,
                thumbnail_path: None,
                last_update: None,
            })
            .collect())
    }

    async fn get_uploads(&self, channel_id: &str) -> Result<Vec<Video>> {
        let uploads_id = self.uploads_playlist_id(channel_id).await?;
        tracing::debug!(channel_id, uploads_id = %uploads_id, "Resolved uploads playlist");
        self.get_videos(&uploads_id).await
    }

    async fn get_videos(&self, playlist_id: &str) -> Result<Vec<Video>> {
        let items: Vec<PlaylistItem> = self
            .list("playlistItems", &[("part", "snippet"), ("playlistId", playlist_id)])
            .await?;
        Ok(items.into_iter().filter_map(to_video).collect())
    }

    async fn get_playlists(&self, channel_id: &str) -> Result<Vec<Playlist>> {
        let items: Vec<PlaylistResource> = self
            .list("playlists", &[("part", "snippet"), ("channelId", channel_id)])
            .await?;

        let mut playlists = Vec::with_capacity(items.len());
        for item in items {
            let videos = match self.get_videos(&item.id).await {
                Ok(videos) => videos,
                Err(e) => {
                    tracing::warn!(playlist_id = %item.id, error = %e, "Skipping playlist without videos");
                    continue;
                }
            };
            playlists.push(Playlist {
                id: item.id,
                title: item.snippet.title,
                videos,
                thumbnails: item.snippet.thumbnails,
                thumbnail_path: None,
            });
        }

        tracing::info!(channel_id, count = playlists.len(), "Fetched playlists");
        Ok(playlists)
    }
}
