use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::auth;
use crate::model::{MAX_PAGE_SIZE, ThumbnailSize};

const APP_NAME: &str = "yt_feed";
const CONFIG_FILE_NAME: &str = "config.toml";
const THUMBNAILS_DIR: &str = "thumbnails";
const DEFAULT_PLAYER: &str = "mpv";
const CHANNEL_ID_PATTERN: &str = r"^[a-zA-Z0-9_-]{24}$";

pub const ENV_CACHE_DIR: &str = "YT_FEED_CACHE_DIR";

static CHANNEL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CHANNEL_ID_PATTERN).expect("channel id pattern is valid"));

const DEFAULT_CONFIG: &str = r#"# YouTube Data API key (https://console.cloud.google.com/)
# api_key = "<YT_API_KEY>"
# or a file holding it
# api_key_path = "/path/to/api_key"
# YT_FEED_API_KEY is used when neither is set

# results per request, at most 50
max_results = 50

# alternative cache directory, used when it exists
# "$XDG_CACHE_HOME/yt_feed" by default
# cache_dir = "/path/to/cache"

# thumbnails are stored in <cache>/thumbnails as '<size><id>.<ext>'
thumbnails_disable = false

# high (~15-30k), medium (~8-15k), default (~3-4k)
thumbnails_size = "default"

# player started with the video URL
player = "mpv"

# channel ids
# channels = [
#   "UCxxxxxxxxxxxxxxxxxxxxxx",
# ]
"#;

// ---------------------------------------------------------------------------
// ConfigFile: deserialized from TOML (all fields optional)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub api_key_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub max_results: Option<u32>,
    pub thumbnails_disable: Option<bool>,
    pub thumbnails_size: Option<String>,
    pub player: Option<String>,
    pub channels: Vec<String>,
}

// ---------------------------------------------------------------------------
// AppConfig: resolved once at startup and passed by reference
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_key: String,
    pub cache_dir: PathBuf,
    pub thumb_dir: PathBuf,
    pub max_results: u32,
    pub thumbnails_disabled: bool,
    pub thumbnail_size: ThumbnailSize,
    pub player: String,
    pub channels: Vec<String>,
}

/// Where the config file came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    Loaded(PathBuf),
    /// No file existed; the commented default was written here
    Written(PathBuf),
    /// Neither HOME nor XDG_CONFIG_HOME is set
    Defaults,
}

impl ConfigSource {
    /// Call once logging is initialized
    pub fn log(&self) {
        match self {
            Self::Loaded(path) => tracing::info!("config: loaded from {}", path.display()),
            Self::Written(path) => tracing::info!("config: new config written to {}", path.display()),
            Self::Defaults => tracing::info!("config: no HOME or XDG_CONFIG_HOME set, using defaults"),
        }
    }
}

impl ConfigFile {
    /// `cache_override` wins; `cache_dir` from the file is used only when that
    /// directory exists; otherwise `default_cache_dir`.
    pub fn choose_cache_dir(
        &self,
        default_cache_dir: PathBuf,
        cache_override: Option<PathBuf>,
    ) -> PathBuf {
        cache_override
            .or_else(|| self.cache_dir.clone().filter(|dir| dir.is_dir()))
            .unwrap_or(default_cache_dir)
    }

    pub fn resolve(self, api_key: String, cache_dir: PathBuf) -> AppConfig {
        let config = AppConfig {
            api_key,
            thumb_dir: cache_dir.join(THUMBNAILS_DIR),
            cache_dir,
            max_results: self.max_results.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            thumbnails_disabled: self.thumbnails_disable.unwrap_or(false),
            thumbnail_size: self
                .thumbnails_size
                .as_deref()
                .map(ThumbnailSize::from_name)
                .unwrap_or_default(),
            player: self.player.unwrap_or_else(|| DEFAULT_PLAYER.into()),
            channels: valid_channel_ids(self.channels),
        };
        tracing::info!(
            cache_dir = %config.cache_dir.display(),
            channels = config.channels.len(),
            max_results = config.max_results,
            thumbnails_disabled = config.thumbnails_disabled,
            thumbnail_size = ?config.thumbnail_size,
            player = %config.player,
            "config resolved"
        );
        config
    }
}

impl AppConfig {
    #[cfg(test)]
    pub fn for_cache_dir(dir: &Path, channels: Vec<String>) -> Self {
        Self {
            api_key: String::new(),
            cache_dir: dir.to_path_buf(),
            thumb_dir: dir.join(THUMBNAILS_DIR),
            max_results: MAX_PAGE_SIZE,
            thumbnails_disabled: true,
            thumbnail_size: ThumbnailSize::Default,
            player: DEFAULT_PLAYER.into(),
            channels,
        }
    }
}

/// Drop entries that cannot be channel IDs
fn valid_channel_ids(ids: Vec<String>) -> Vec<String> {
    ids.into_iter()
        .filter(|id| {
            let valid = CHANNEL_ID.is_match(id);
            if !valid {
                tracing::warn!(id = %id, "config: ignoring invalid channel id");
            }
            valid
        })
        .collect()
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// `$XDG_<var>` if set and existing, else `$HOME/<fallback>`
fn xdg_dir(var: &str, fallback: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .map(PathBuf::from)
        .filter(|dir| dir.is_dir())
        .or_else(|| home_dir().map(|home| home.join(fallback)))
}

fn config_path() -> Option<PathBuf> {
    Some(xdg_dir("XDG_CONFIG_HOME", ".config")?.join(APP_NAME).join(CONFIG_FILE_NAME))
}

/// Load the config file, writing the commented default when none exists.
/// Returns an error if the file exists but cannot be parsed.
///
/// Nothing is logged here: this runs before logging is initialized, so the
/// returned [`ConfigSource`] is reported by the caller afterwards.
pub fn load_config_file() -> Result<(ConfigFile, ConfigSource)> {
    match config_path() {
        Some(path) => load_config_file_at(&path),
        None => Ok((ConfigFile::default(), ConfigSource::Defaults)),
    }
}

fn load_config_file_at(path: &Path) -> Result<(ConfigFile, ConfigSource)> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let file = toml::from_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            Ok((file, ConfigSource::Loaded(path.to_path_buf())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            write_default_config(path)?;
            let file = toml::from_str(DEFAULT_CONFIG).context("default config is invalid")?;
            Ok((file, ConfigSource::Written(path.to_path_buf())))
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Cache root for this run: `YT_FEED_CACHE_DIR`, else the configured
/// `cache_dir` if it exists, else `$XDG_CACHE_HOME/yt_feed`
pub fn cache_root(file: &ConfigFile) -> Result<PathBuf> {
    let default_cache_dir = xdg_dir("XDG_CACHE_HOME", ".cache")
        .context("neither XDG_CACHE_HOME nor HOME is set")?
        .join(APP_NAME);
    let cache_override = std::env::var_os(ENV_CACHE_DIR).map(PathBuf::from);
    Ok(file.choose_cache_dir(default_cache_dir, cache_override))
}

/// Build the application config and prepare the thumbnail directory.
///
/// Call once logging is up: key lookup and channel validation report through
/// `tracing`.
pub fn load(file: ConfigFile, cache_dir: PathBuf) -> Result<AppConfig> {
    let api_key = auth::resolve_api_key(&file)?;

    let config = file.resolve(api_key, cache_dir);
    std::fs::create_dir_all(&config.thumb_dir)
        .with_context(|| format!("failed to create {}", config.thumb_dir.display()))?;
    Ok(config)
}
