//! Best-effort thumbnail downloads into the cache's `thumbnails/` directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::fs;
use url::Url;

use super::types::ThumbnailSize;

const FALLBACK_EXTENSION: &str = ".jpg";

/// Destination file → source URL
pub type ThumbnailBatch = HashMap<PathBuf, String>;

/// Tally of one batch; failures are counted, never returned
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum Outcome {
    Downloaded,
    Skipped,
}

/// Local file for an entity's thumbnail: `<dir>/<size><id><ext>`.
///
/// The extension comes from the URL path and defaults to `.jpg`. An empty URL
/// means the provider had no thumbnail of that size, so there is no file either.
pub fn thumbnail_path(dir: &Path, size: ThumbnailSize, id: &str, url: &str) -> Option<PathBuf> {
    if url.is_empty() {
        return None;
    }

    let extension = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            Path::new(parsed.path())
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());

    Some(dir.join(format!("{}{}{}", size.prefix(), id, extension)))
}

#[derive(Clone, Debug, Default)]
pub struct ThumbnailFetcher {
    client: reqwest::Client,
}

impl ThumbnailFetcher {
    /// Download every entry of the batch concurrently and wait for all of them.
    ///
    /// Files that already exist are left alone. One failed download does not
    /// affect the others.
    pub async fn fetch_all(&self, batch: ThumbnailBatch) -> FetchSummary {
        if batch.is_empty() {
            return FetchSummary::default();
        }

        let total = batch.len();
        let downloads = batch.into_iter().map(|(path, url)| async move {
            let result = self.fetch_one(&path, &url).await;
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), url = %url, error = %e, "Thumbnail download failed");
            }
            result
        });

        let mut summary = FetchSummary::default();
        for result in join_all(downloads).await {
            match result {
                Ok(Outcome::Downloaded) => summary.downloaded += 1,
                Ok(Outcome::Skipped) => summary.skipped += 1,
                Err(_) => summary.failed += 1,
            }
        }

        tracing::debug!(
            total,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Thumbnail batch finished"
        );
        summary
    }

    async fn fetch_one(&self, path: &Path, url: &str) -> Result<Outcome> {
        if fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Outcome::Skipped);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("download from '{url}'"))?
            .error_for_status()?;
        let body = response.bytes().await?;

        fs::write(path, &body)
            .await
            .with_context(|| format!("create '{}'", path.display()))?;
        Ok(Outcome::Downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so any request fails fast.
    const UNREACHABLE: &str = "http://127.0.0.1:9/thumb.jpg";

    #[test]
    fn path_is_deterministic() {
        let dir = Path::new("/cache/thumbnails");
        let url = "https://i.ytimg.com/vi/dQw4w9WgXcQ/mqdefault.jpg";
        let first = thumbnail_path(dir, ThumbnailSize::Medium, "dQw4w9WgXcQ", url);
        let second = thumbnail_path(dir, ThumbnailSize::Medium, "dQw4w9WgXcQ", url);

        assert_eq!(first, second);
        assert_eq!(
            first,
            Some(PathBuf::from("/cache/thumbnails/mediumdQw4w9WgXcQ.jpg"))
        );
    }

    #[test]
    fn path_extension_falls_back_to_jpg() {
        let dir = Path::new("/t");
        assert_eq!(
            thumbnail_path(dir, ThumbnailSize::High, "abc", "https://yt3.ggpht.com/photo=s240"),
            Some(PathBuf::from("/t/highabc.jpg"))
        );
        assert_eq!(
            thumbnail_path(dir, ThumbnailSize::Default, "abc", "https://host/img.webp?x=1"),
            Some(PathBuf::from("/t/defaultabc.webp"))
        );
        assert_eq!(thumbnail_path(dir, ThumbnailSize::Default, "abc", ""), None);
    }

    #[tokio::test]
    async fn existing_files_are_not_requested_again() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("defaultaaaaaaaaaaa.jpg");
        std::fs::write(&existing, b"cached").unwrap();

        let batch = ThumbnailBatch::from([(existing.clone(), UNREACHABLE.to_string())]);
        let summary = ThumbnailFetcher::default().fetch_all(batch).await;

        assert_eq!(summary, FetchSummary { downloaded: 0, skipped: 1, failed: 0 });
        assert_eq!(std::fs::read(&existing).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn downloads_write_the_response_body() {
        let (base, hits) = crate::model::fake::serve_image(b"IMAGE").await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaultdQw4w9WgXcQ.jpg");

        let batch = ThumbnailBatch::from([(path.clone(), format!("{base}/vi/dQw4w9WgXcQ/default.jpg"))]);
        let summary = ThumbnailFetcher::default().fetch_all(batch).await;

        assert_eq!(summary, FetchSummary { downloaded: 1, skipped: 0, failed: 0 });
        assert_eq!(std::fs::read(&path).unwrap(), b"IMAGE");
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_do_not_abort_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("existing.jpg");
        std::fs::write(&existing, b"cached").unwrap();
        let missing = dir.path().join("missing.jpg");

        let batch = ThumbnailBatch::from([
            (existing.clone(), UNREACHABLE.to_string()),
            (missing.clone(), UNREACHABLE.to_string()),
        ]);
        let summary = ThumbnailFetcher::default().fetch_all(batch).await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert!(!missing.exists());
    }
}
