//! Model module - domain data and the storage layer
//!
//! - `types`: Channel, playlist and video entities plus the decoded selection payload
//! - `youtube_client`: Content provider seam and its YouTube Data API implementation
//! - `thumbnails`: Concurrent best-effort thumbnail downloads
//! - `cache`: Cache-aside JSON file store in front of the provider
//! - `session`: Navigation state threaded through the session engine

mod types;
mod youtube_client;
mod thumbnails;
mod cache;
mod session;

#[cfg(test)]
pub(crate) mod fake;

pub use types::{Channel, Playlist, Selection, ThumbnailSize, Video};

pub use youtube_client::{YouTubeClient, MAX_PAGE_SIZE};

pub use cache::CacheStore;

pub use session::SessionState;
