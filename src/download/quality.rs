//! Quality tiers and their yt-dlp format selectors.
//!
//! One process-wide table; every platform profile reads the same
//! selectors, so the tiers cannot drift between platforms.

/// Requested quality tier for a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    /// Worst available streams
    Low,
    /// Up to 720p
    Medium,
    /// Up to 1080p
    High,
}

impl QualityTier {
    /// Parse a tier name from a callback payload, falling back to
    /// `Medium` for anything unrecognized.
    #[must_use]
    pub fn parse_or_medium(name: &str) -> Self {
        match name {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// Wire name used in callback payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// yt-dlp format selector for combined audio+video.
    ///
    /// The `filesize<50M` bound is best-effort only (filesize metadata may
    /// be unknown for some streams); the on-disk size check after download
    /// is the authoritative one.
    #[must_use]
    pub const fn format_selector(self) -> &'static str {
        match self {
            Self::Low => "worstvideo[filesize<50M]+worstaudio[filesize<50M]/worst[filesize<50M]",
            Self::Medium => {
                "bestvideo[height<=720][filesize<50M]+bestaudio[filesize<50M]/best[height<=720][filesize<50M]"
            }
            Self::High => {
                "bestvideo[height<=1080][filesize<50M]+bestaudio[filesize<50M]/best[height<=1080][filesize<50M]"
            }
        }
    }
}
