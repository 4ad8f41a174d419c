//! Core entity types shared by the cache, the menu renderer and the session engine

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CHANNEL_ID_LEN: usize = 24;
pub const PLAYLIST_ID_LEN: usize = 34;
pub const VIDEO_ID_LEN: usize = 11;

/// Title the provider gives to videos the viewer is not allowed to see
pub const PRIVATE_VIDEO_TITLE: &str = "Private video";

/// Prefix of the composite `back` payload that returns to a channel's action menu
pub const CHANNEL_KEY_PREFIX: &str = "channel:";

/// Thumbnail size class, as named by the provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailSize {
    #[default]
    Default,
    Medium,
    High,
}

impl ThumbnailSize {
    /// Parse a configured size name, falling back to `default` for anything unknown
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Default,
        }
    }

    /// File name prefix for thumbnails of this size
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// One thumbnail per size class. A size the provider omitted stays a zero value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thumbnails {
    pub default: Thumbnail,
    pub medium: Thumbnail,
    pub high: Thumbnail,
}

impl Thumbnails {
    pub fn get(&self, size: ThumbnailSize) -> &Thumbnail {
        match size {
            ThumbnailSize::Default => &self.default,
            ThumbnailSize::Medium => &self.medium,
            ThumbnailSize::High => &self.high,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Channel {
    pub id: String,
    pub title: String,
    #[serde(rename = "thumb", default)]
    pub thumbnails: Thumbnails,
    #[serde(rename = "thumb_path", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(rename = "thumb", default)]
    pub thumbnails: Thumbnails,
    #[serde(rename = "thumb_path", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(rename = "thumb", default)]
    pub thumbnails: Thumbnails,
    #[serde(rename = "thumb_path", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
}

impl Video {
    pub fn is_private(&self) -> bool {
        self.title == PRIVATE_VIDEO_TITLE
    }
}

/// Entities that carry provider thumbnails and a local thumbnail file
pub trait Thumbnailed {
    fn entity_id(&self) -> &str;
    fn thumbnails(&self) -> &Thumbnails;
    fn set_thumbnail_path(&mut self, path: Option<PathBuf>);
}

macro_rules! impl_thumbnailed {
    ($($ty:ty),+) => {
        $(
            impl Thumbnailed for $ty {
                fn entity_id(&self) -> &str {
                    &self.id
                }

                fn thumbnails(&self) -> &Thumbnails {
                    &self.thumbnails
                }

                fn set_thumbnail_path(&mut self, path: Option<PathBuf>) {
                    self.thumbnail_path = path;
                }
            }
        )+
    };
}

impl_thumbnailed!(Channel, Playlist, Video);

/// The opaque `data` payload of a menu selection, decoded once at the protocol boundary.
///
/// The launcher echoes back whatever `data` a line carried. Channel, playlist and
/// video IDs have distinct fixed lengths, which is what tells them apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Channel(String),
    Playlist(String),
    Video(String),
    /// `channel:<id>`, carried by `back` lines of listing screens
    ChannelMenu(String),
    Unknown(String),
}

impl Selection {
    /// IDs must also be made of the provider's ID alphabet; they end up in
    /// cache file names.
    pub fn parse(data: &str) -> Self {
        if let Some(id) = data.strip_prefix(CHANNEL_KEY_PREFIX) {
            if id.len() == CHANNEL_ID_LEN && is_id_alphabet(id) {
                return Self::ChannelMenu(id.to_string());
            }
            return Self::Unknown(data.to_string());
        }
        if !is_id_alphabet(data) {
            return Self::Unknown(data.to_string());
        }
        match data.len() {
            CHANNEL_ID_LEN => Self::Channel(data.to_string()),
            PLAYLIST_ID_LEN => Self::Playlist(data.to_string()),
            VIDEO_ID_LEN => Self::Video(data.to_string()),
            _ => Self::Unknown(data.to_string()),
        }
    }

    /// Composite payload that leads back to the action menu of `channel_id`
    pub fn channel_key(channel_id: &str) -> String {
        format!("{CHANNEL_KEY_PREFIX}{channel_id}")
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Channel(id)
            | Self::Playlist(id)
            | Self::Video(id)
            | Self::ChannelMenu(id)
            | Self::Unknown(id) => id,
        }
    }
}

fn is_id_alphabet(id: &str) -> bool {
    id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_dispatches_on_id_length() {
        let channel = "UC".to_string() + &"a".repeat(22);
        let playlist = "PL".to_string() + &"b".repeat(32);
        let video = "dQw4w9WgXcQ";

        assert_eq!(Selection::parse(&channel), Selection::Channel(channel.clone()));
        assert_eq!(Selection::parse(&playlist), Selection::Playlist(playlist.clone()));
        assert_eq!(Selection::parse(video), Selection::Video(video.to_string()));
        assert_eq!(Selection::parse("videos"), Selection::Unknown("videos".into()));
        assert_eq!(Selection::parse(""), Selection::Unknown(String::new()));
    }

    #[test]
    fn path_like_data_is_never_an_id() {
        let escaping_channel = "../../../../../etc/passwd";
        assert_eq!(escaping_channel.len(), CHANNEL_ID_LEN + 1);
        let escaping_channel = &escaping_channel[1..];
        assert_eq!(escaping_channel.len(), CHANNEL_ID_LEN);
        assert_eq!(
            Selection::parse(escaping_channel),
            Selection::Unknown(escaping_channel.into())
        );
        assert_eq!(Selection::parse("abc/def.gh"), Selection::Unknown("abc/def.gh".into()));

        let key = format!("{CHANNEL_KEY_PREFIX}{escaping_channel}");
        assert_eq!(Selection::parse(&key), Selection::Unknown(key.clone()));
    }

    #[test]
    fn channel_key_parses_back_to_channel_menu() {
        let channel = "UC".to_string() + &"a".repeat(22);
        let key = Selection::channel_key(&channel);
        assert_eq!(key.len(), CHANNEL_KEY_PREFIX.len() + CHANNEL_ID_LEN);
        assert_eq!(Selection::parse(&key), Selection::ChannelMenu(channel));
    }

    #[test]
    fn thumbnail_size_names() {
        assert_eq!(ThumbnailSize::from_name("high"), ThumbnailSize::High);
        assert_eq!(ThumbnailSize::from_name(" Medium "), ThumbnailSize::Medium);
        assert_eq!(ThumbnailSize::from_name("huge"), ThumbnailSize::Default);
        assert_eq!(ThumbnailSize::High.prefix(), "high");
    }

    #[test]
    fn missing_thumbnail_sizes_decode_as_placeholders() {
        let json = r#"{"id":"abc","title":"t","thumb":{"high":{"url":"u","width":480,"height":360}}}"#;
        let video: Video = serde_json::from_str(json).unwrap();
        assert_eq!(video.thumbnails.get(ThumbnailSize::High).width, 480);
        assert_eq!(video.thumbnails.default, Thumbnail::default());
        assert!(video.thumbnail_path.is_none());
    }
}
