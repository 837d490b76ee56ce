//! yt-dlp invocation: the extraction collaborator behind [`MediaFetcher`].
//!
//! The binary is driven through an argument vector (no shell involved);
//! it is expected to either produce the named output file or exit
//! non-zero, in which case the stderr tail becomes the error message.

use super::{MediaKind, QualityTier};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Audio fetches always request the best stream under the size cap.
const AUDIO_FORMAT: &str = "bestaudio[filesize<50M]";

/// Target bitrate for the mp3 transcode.
const AUDIO_QUALITY: &str = "192K";

/// Extraction failure surfaced to the download engine.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The extractor binary could not be launched at all
    #[error("failed to launch {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    /// The extractor ran and reported an error
    #[error("{0}")]
    Extractor(String),
}

/// What to fetch: the media kind plus the quality tier driving format
/// selection for video. Audio and image fetches ignore the tier.
#[derive(Debug, Clone, Copy)]
pub struct FetchSpec {
    pub kind: MediaKind,
    pub quality: QualityTier,
}

/// Abstraction over the extraction tool so the engine can be driven by a
/// stub in tests.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch `url` into `dest` according to `spec`.
    async fn fetch(&self, url: &str, spec: &FetchSpec, dest: &Path) -> Result<(), DownloadError>;
}

/// Runs the real `yt-dlp` binary.
pub struct YtDlp {
    bin: String,
}

impl YtDlp {
    #[must_use]
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn build_args(spec: &FetchSpec, dest: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-playlist".into(),
        ];

        match spec.kind {
            MediaKind::Video => args.extend([
                "-f".into(),
                spec.quality.format_selector().into(),
                "--merge-output-format".into(),
                "mp4".into(),
                "-o".into(),
                dest.display().to_string(),
            ]),
            MediaKind::Audio => args.extend([
                "-f".into(),
                AUDIO_FORMAT.into(),
                "-x".into(),
                "--audio-format".into(),
                "mp3".into(),
                "--audio-quality".into(),
                AUDIO_QUALITY.into(),
                "-o".into(),
                dest.display().to_string(),
            ]),
            MediaKind::Image => {
                // yt-dlp appends the thumbnail extension itself, so the
                // template is the destination without its ".jpg".
                let stem = dest.with_extension("");
                args.extend([
                    "--skip-download".into(),
                    "--write-thumbnail".into(),
                    "--convert-thumbnails".into(),
                    "jpg".into(),
                    "-o".into(),
                    stem.display().to_string(),
                ]);
            }
        }

        args
    }
}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn fetch(&self, url: &str, spec: &FetchSpec, dest: &Path) -> Result<(), DownloadError> {
        let args = Self::build_args(spec, dest);
        debug!(bin = %self.bin, kind = spec.kind.name(), url, "invoking yt-dlp");

        let output = Command::new(&self.bin)
            .args(&args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| DownloadError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(DownloadError::Extractor(stderr_tail(&output.stderr)))
        }
    }
}

/// Last non-empty stderr line; yt-dlp prints its "ERROR: ..." summary there.
fn stderr_tail(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map_or_else(
            || "extractor exited with an error".to_string(),
            |line| line.trim().to_string(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec(kind: MediaKind, quality: QualityTier) -> FetchSpec {
        FetchSpec { kind, quality }
    }

    #[test]
    fn video_args_use_tier_selector() {
        let dest = PathBuf::from("/tmp/video_x.mp4");
        let args = YtDlp::build_args(&spec(MediaKind::Video, QualityTier::High), &dest);
        assert!(args.contains(&QualityTier::High.format_selector().to_string()));
        assert!(args.contains(&"--merge-output-format".to_string()));
        assert!(args.contains(&"/tmp/video_x.mp4".to_string()));
    }

    #[test]
    fn audio_args_request_mp3_transcode() {
        let dest = PathBuf::from("/tmp/audio_x.mp3");
        let args = YtDlp::build_args(&spec(MediaKind::Audio, QualityTier::Low), &dest);
        assert!(args.contains(&AUDIO_FORMAT.to_string()));
        assert!(args.contains(&"-x".to_string()));
        assert!(args.contains(&"mp3".to_string()));
        // The tier only drives video format selection
        assert!(!args.contains(&QualityTier::Low.format_selector().to_string()));
    }

    #[test]
    fn image_args_strip_the_extension() {
        let dest = PathBuf::from("/tmp/image_x.jpg");
        let args = YtDlp::build_args(&spec(MediaKind::Image, QualityTier::Medium), &dest);
        assert!(args.contains(&"--write-thumbnail".to_string()));
        assert!(args.contains(&"/tmp/image_x".to_string()));
        assert!(!args.contains(&"/tmp/image_x.jpg".to_string()));
    }

    #[test]
    fn stderr_tail_picks_last_line() {
        let raw = b"WARNING: something\nERROR: Video unavailable\n\n";
        assert_eq!(stderr_tail(raw), "ERROR: Video unavailable");
        assert_eq!(stderr_tail(b""), "extractor exited with an error");
    }
}
