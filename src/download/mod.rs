//! Download engine: one polymorphic downloader with per-platform profiles.
//!
//! The engine owns the fetch → size-check → fallback chain; platform
//! differences are injected via [`PlatformProfile`] and the extraction
//! tool via [`MediaFetcher`], so the same code path serves every platform
//! and tests can run it against a stub fetcher.

pub mod platform;
pub mod quality;
pub mod ytdlp;

pub use platform::{is_supported_url, Platform, PlatformProfile};
pub use quality::QualityTier;
pub use ytdlp::{DownloadError, FetchSpec, MediaFetcher, YtDlp};

use crate::config::MAX_MEDIA_BYTES;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Classification of a downloaded artifact; decides the send primitive
/// and the temporary file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }
}

/// A single download request, created when the user picks a quality tier
/// and consumed exactly once.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub quality: QualityTier,
}

/// Result of a download attempt: either a deliverable file or a
/// user-facing error message, never both.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// A file within the size cap, ready to send. The path stops being
    /// valid once the sender has delivered and removed it.
    Media { path: PathBuf, kind: MediaKind },
    /// User-facing failure text, relayed verbatim.
    Failed(String),
}

/// Polymorphic downloader shared by all platforms.
pub struct Downloader<F> {
    fetcher: F,
    workdir: PathBuf,
}

impl<F: MediaFetcher> Downloader<F> {
    pub fn new(fetcher: F, workdir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            workdir: workdir.into(),
        }
    }

    /// Run the fetch / size-check / fallback chain for one request.
    ///
    /// Extraction failures never propagate; every path out of here is a
    /// [`DownloadOutcome`]. Artifacts are named by a fresh request id so
    /// two in-flight requests from the same chat cannot collide.
    pub async fn download(&self, platform: Platform, request: &DownloadRequest) -> DownloadOutcome {
        if let Err(e) = fs::create_dir_all(&self.workdir).await {
            warn!(workdir = %self.workdir.display(), error = %e, "cannot create work directory");
            return DownloadOutcome::Failed(format!(
                "Error downloading {} media: {e}",
                platform.display_name()
            ));
        }

        let request_id = Uuid::new_v4();
        let profile = platform.profile();
        info!(
            platform = platform.name(),
            quality = request.quality.as_str(),
            %request_id,
            "starting download"
        );

        for kind in [profile.primary, profile.fallback] {
            let dest = self.output_path(kind, request_id);
            let spec = FetchSpec {
                kind,
                quality: request.quality,
            };

            if let Err(e) = self.fetcher.fetch(&request.url, &spec, &dest).await {
                warn!(
                    platform = platform.name(),
                    kind = kind.name(),
                    error = %e,
                    "extraction failed"
                );
                return DownloadOutcome::Failed(format!(
                    "Error downloading {} media: {e}",
                    platform.display_name()
                ));
            }

            if within_size_cap(&dest).await {
                return DownloadOutcome::Media { path: dest, kind };
            }
            debug!(
                kind = kind.name(),
                "artifact missing or over the size cap, trying fallback"
            );
        }

        DownloadOutcome::Failed(format!(
            "Failed to download {} media or file too large.",
            platform.display_name()
        ))
    }

    /// Access the injected fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn output_path(&self, kind: MediaKind, request_id: Uuid) -> PathBuf {
        self.workdir.join(format!(
            "{}_{}.{}",
            kind.name(),
            request_id.simple(),
            kind.extension()
        ))
    }
}

/// Authoritative size check: the artifact must exist on disk and be
/// within [`MAX_MEDIA_BYTES`].
async fn within_size_cap(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(meta) => meta.len() <= MAX_MEDIA_BYTES,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_are_request_scoped() {
        struct NoFetch;
        #[async_trait::async_trait]
        impl MediaFetcher for NoFetch {
            async fn fetch(
                &self,
                _url: &str,
                _spec: &FetchSpec,
                _dest: &Path,
            ) -> Result<(), DownloadError> {
                Ok(())
            }
        }

        let downloader = Downloader::new(NoFetch, "/tmp/work");
        let id = Uuid::new_v4();
        let video = downloader.output_path(MediaKind::Video, id);
        let audio = downloader.output_path(MediaKind::Audio, id);

        let video_name = video.file_name().map(|n| n.to_string_lossy().to_string());
        assert_eq!(
            video_name,
            Some(format!("video_{}.mp4", id.simple()))
        );
        assert!(audio.to_string_lossy().ends_with(".mp3"));
        assert_ne!(video, audio);

        // A second request id never collides with the first
        let other = downloader.output_path(MediaKind::Video, Uuid::new_v4());
        assert_ne!(video, other);
    }

    #[tokio::test]
    async fn missing_artifact_fails_the_size_check() {
        assert!(!within_size_cap(Path::new("/nonexistent/video_x.mp4")).await);
    }
}
