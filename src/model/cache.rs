//! Cache-aside storage for channels, playlists and video lists.
//!
//! Every entity set lives in one JSON file under the cache root. A file that
//! exists is fresh; only an explicit force-update replaces it. Fresh data is
//! returned only after it has been written to disk.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::fs;

use crate::config::AppConfig;

use super::thumbnails::{ThumbnailBatch, ThumbnailFetcher, thumbnail_path};
use super::types::{Channel, Playlist, ThumbnailSize, Thumbnailed, Video};
use super::youtube_client::ContentProvider;

const CHANNELS_FILE: &str = "channels.json";
const PLAYLISTS_PREFIX: &str = "playlists";
const VIDEOS_PREFIX: &str = "videos";
const JSON_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("provider request failed: {0:#}")]
    Provider(#[source] anyhow::Error),

    #[error("can't persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt cache file {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Clone, Copy, Debug)]
enum VideoSource {
    Uploads,
    Playlist,
}

pub struct CacheStore {
    provider: Arc<dyn ContentProvider>,
    /// `None` when thumbnails are disabled
    fetcher: Option<ThumbnailFetcher>,
    cache_dir: PathBuf,
    thumb_dir: PathBuf,
    thumb_size: ThumbnailSize,
    channel_ids: Vec<String>,
}

impl CacheStore {
    pub fn new(config: &AppConfig, provider: Arc<dyn ContentProvider>) -> Self {
        let fetcher = (!config.thumbnails_disabled).then(ThumbnailFetcher::default);
        Self {
            provider,
            fetcher,
            cache_dir: config.cache_dir.clone(),
            thumb_dir: config.thumb_dir.clone(),
            thumb_size: config.thumbnail_size,
            channel_ids: config.channels.clone(),
        }
    }

    /// All configured channels, keyed by ID
    pub async fn read_channels(&self) -> CacheResult<HashMap<String, Channel>> {
        let path = self.cache_dir.join(CHANNELS_FILE);
        if let Some(channels) = load::<HashMap<String, Channel>>(&path).await? {
            tracing::debug!(count = channels.len(), "Channels served from cache");
            return Ok(channels);
        }

        let mut fetched = self
            .provider
            .get_channels(&self.channel_ids)
            .await
            .map_err(CacheError::Provider)?;

        // One timestamp for the whole batch
        let now = Utc::now();
        let mut batch = ThumbnailBatch::new();
        for channel in &mut fetched {
            channel.last_update = Some(now);
        }
        self.assign_thumbnails(&mut fetched, &mut batch);
        self.download(batch).await;

        let channels: HashMap<String, Channel> =
            fetched.into_iter().map(|c| (c.id.clone(), c)).collect();
        persist(&path, &channels).await?;

        tracing::info!(count = channels.len(), "Channels fetched and cached");
        Ok(channels)
    }

    /// Playlists of a channel keyed by playlist ID, each with its videos
    pub async fn read_all_playlists(
        &self,
        channel_id: &str,
        force_update: bool,
    ) -> CacheResult<HashMap<String, Playlist>> {
        let path = self.entity_path(PLAYLISTS_PREFIX, channel_id);
        if !force_update {
            if let Some(playlists) = load::<Vec<Playlist>>(&path).await? {
                tracing::debug!(channel_id, count = playlists.len(), "Playlists served from cache");
                return Ok(index_playlists(playlists));
            }
        }

        let mut playlists = self
            .provider
            .get_playlists(channel_id)
            .await
            .map_err(CacheError::Provider)?;

        let mut batch = ThumbnailBatch::new();
        self.assign_thumbnails(&mut playlists, &mut batch);
        // Nested videos get paths too; shared videos collapse into one download
        for playlist in &mut playlists {
            self.assign_thumbnails(&mut playlist.videos, &mut batch);
        }
        self.download(batch).await;

        // Persist-or-fail: unsaved data is never handed out
        persist(&path, &playlists).await?;

        tracing::info!(channel_id, count = playlists.len(), force_update, "Playlists fetched and cached");
        Ok(index_playlists(playlists))
    }

    /// Latest uploads of a channel, in provider order
    pub async fn read_uploads(&self, channel_id: &str, force_update: bool) -> CacheResult<Vec<Video>> {
        self.read_videos(channel_id, VideoSource::Uploads, force_update).await
    }

    /// Videos of a single playlist, independent of any channel
    pub async fn read_playlist(&self, playlist_id: &str) -> CacheResult<Vec<Video>> {
        self.read_videos(playlist_id, VideoSource::Playlist, false).await
    }

    async fn read_videos(
        &self,
        key: &str,
        source: VideoSource,
        force_update: bool,
    ) -> CacheResult<Vec<Video>> {
        let path = self.entity_path(VIDEOS_PREFIX, key);
        if !force_update {
            if let Some(videos) = load::<Vec<Video>>(&path).await? {
                tracing::debug!(key, ?source, count = videos.len(), "Videos served from cache");
                return Ok(videos);
            }
        }

        let fetched = match source {
            VideoSource::Uploads => self.provider.get_uploads(key).await,
            VideoSource::Playlist => self.provider.get_videos(key).await,
        };
        let mut videos = fetched.map_err(CacheError::Provider)?;

        let mut batch = ThumbnailBatch::new();
        self.assign_thumbnails(&mut videos, &mut batch);
        self.download(batch).await;

        persist(&path, &videos).await?;

        tracing::info!(key, ?source, count = videos.len(), force_update, "Videos fetched and cached");
        Ok(videos)
    }

    fn entity_path(&self, prefix: &str, id: &str) -> PathBuf {
        self.cache_dir.join(format!("{prefix}{id}.{JSON_EXTENSION}"))
    }

    /// Point every entity at its thumbnail file and queue the download
    fn assign_thumbnails<T: Thumbnailed>(&self, items: &mut [T], batch: &mut ThumbnailBatch) {
        for item in items {
            let url = item.thumbnails().get(self.thumb_size).url.clone();
            let path = thumbnail_path(&self.thumb_dir, self.thumb_size, item.entity_id(), &url);
            if let Some(path) = &path {
                batch.insert(path.clone(), url);
            }
            item.set_thumbnail_path(path);
        }
    }

    async fn download(&self, batch: ThumbnailBatch) {
        if let Some(fetcher) = &self.fetcher {
            fetcher.fetch_all(batch).await;
        }
    }
}

fn index_playlists(playlists: Vec<Playlist>) -> HashMap<String, Playlist> {
    playlists.into_iter().map(|p| (p.id.clone(), p)).collect()
}

/// `Ok(None)` when the file does not exist yet
async fn load<T: DeserializeOwned>(path: &Path) -> CacheResult<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            tracing::error!(path = %path.display(), error = %source, "Cache file read failed");
            return Err(CacheError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes).map(Some).map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "Cache file decode failed");
        CacheError::Decode {
            path: path.to_path_buf(),
            source,
        }
    })
}

async fn persist<T: Serialize>(path: &Path, value: &T) -> CacheResult<()> {
    let result = match serde_json::to_vec(value) {
        Ok(bytes) => fs::write(path, bytes).await,
        Err(e) => Err(io::Error::from(e)),
    };

    result.map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "Cache file write failed");
        CacheError::Persist {
            path: path.to_path_buf(),
            source,
        }
    })
}
