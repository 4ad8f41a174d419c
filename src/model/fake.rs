//! In-memory provider for tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::types::{Channel, Playlist, Thumbnail, Thumbnails, Video};
use super::youtube_client::ContentProvider;

pub fn channel_id(n: u32) -> String {
    format!("UC{n:022}")
}

pub fn playlist_id(n: u32) -> String {
    format!("PL{n:032}")
}

pub fn video_id(n: u32) -> String {
    format!("vid{n:08}")
}

fn thumbnails(id: &str) -> Thumbnails {
    Thumbnails {
        default: Thumbnail {
            width: 120,
            height: 90,
            url: format!("https://i.ytimg.com/vi/{id}/default.jpg"),
        },
        ..Thumbnails::default()
    }
}

pub fn video(n: u32, title: &str) -> Video {
    let id = video_id(n);
    Video {
        thumbnails: thumbnails(&id),
        id,
        title: title.to_string(),
        thumbnail_path: None,
    }
}

pub fn playlist(n: u32, title: &str, videos: Vec<Video>) -> Playlist {
    let id = playlist_id(n);
    Playlist {
        thumbnails: thumbnails(&id),
        id,
        title: title.to_string(),
        videos,
        thumbnail_path: None,
    }
}

pub fn channel(n: u32, title: &str) -> Channel {
    let id = channel_id(n);
    Channel {
        thumbnails: thumbnails(&id),
        id,
        title: title.to_string(),
        thumbnail_path: None,
        last_update: None,
    }
}

/// Point every default-size thumbnail at `base` instead of the real CDN
pub fn rehost_thumbnails(videos: &mut [Video], base: &str) {
    for video in videos {
        video.thumbnails.default.url = format!("{base}/vi/{}/default.jpg", video.id);
    }
}

/// Minimal HTTP server answering every request with `body`.
///
/// Returns the base URL and a counter of requests served. The server lives as
/// long as the test runtime.
pub async fn serve_image(body: &'static [u8]) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let counter = counter.clone();
            tokio::spawn(async move {
                // Read up to the end of the request head; there is no body
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);

                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), hits)
}

#[derive(Default)]
pub struct FakeProvider {
    pub channels: Vec<Channel>,
    pub uploads: HashMap<String, Vec<Video>>,
    pub playlists: HashMap<String, Vec<Playlist>>,
    pub channel_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub playlist_calls: AtomicUsize,
    pub video_calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeProvider {
    /// Two channels; the first has three uploads (one private) and two playlists
    pub fn sample() -> Self {
        let first = channel_id(1);
        Self {
            channels: vec![channel(1, "First Channel"), channel(2, "Second Channel")],
            uploads: HashMap::from([(
                first.clone(),
                vec![
                    video(1, "Newest upload"),
                    video(2, "Private video"),
                    video(3, "Older upload"),
                ],
            )]),
            playlists: HashMap::from([(
                first,
                vec![
                    playlist(1, "Tutorials", vec![video(10, "Part one"), video(11, "Part two")]),
                    playlist(2, "Live", vec![video(20, "Private video")]),
                ],
            )]),
            ..Self::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.channel_calls.load(Ordering::SeqCst)
            + self.upload_calls.load(Ordering::SeqCst)
            + self.playlist_calls.load(Ordering::SeqCst)
            + self.video_calls.load(Ordering::SeqCst)
    }

    fn check(&self, counter: &AtomicUsize) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            bail!("provider unavailable");
        }
        Ok(())
    }

    fn all_playlists(&self) -> impl Iterator<Item = &Playlist> {
        self.playlists.values().flatten()
    }
}

#[async_trait]
impl ContentProvider for FakeProvider {
    async fn get_channels(&self, ids: &[String]) -> Result<Vec<Channel>> {
        self.check(&self.channel_calls)?;
        Ok(self
            .channels
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn get_uploads(&self, channel_id: &str) -> Result<Vec<Video>> {
        self.check(&self.upload_calls)?;
        Ok(self.uploads.get(channel_id).cloned().unwrap_or_default())
    }

    async fn get_videos(&self, playlist_id: &str) -> Result<Vec<Video>> {
        self.check(&self.video_calls)?;
        Ok(self
            .all_playlists()
            .find(|p| p.id == playlist_id)
            .map(|p| p.videos.clone())
            .unwrap_or_default())
    }

    async fn get_playlists(&self, channel_id: &str) -> Result<Vec<Playlist>> {
        self.check(&self.playlist_calls)?;
        Ok(self.playlists.get(channel_id).cloned().unwrap_or_default())
    }
}
