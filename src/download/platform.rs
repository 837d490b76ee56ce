//! Platform classification from raw message text.
//!
//! Validation is a deliberate case-insensitive substring match against a
//! fixed allow-list; any text containing one of these domains is accepted,
//! malformed or not, and everything else is rejected up front.

use super::MediaKind;

/// Domains accepted by the URL classifier.
const ALLOWED_DOMAINS: &[&str] = &[
    "tiktok.com",
    "instagram.com",
    "facebook.com",
    "youtube.com",
    "youtu.be",
];

/// True if the text contains any allow-listed domain.
#[must_use]
pub fn is_supported_url(text: &str) -> bool {
    let lower = text.to_lowercase();
    ALLOWED_DOMAINS.iter().any(|domain| lower.contains(domain))
}

/// Supported source platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Youtube,
    TikTok,
    Instagram,
    Facebook,
}

/// Media kinds attempted for a platform, in order.
#[derive(Debug, Clone, Copy)]
pub struct PlatformProfile {
    /// Kind fetched first
    pub primary: MediaKind,
    /// Kind fetched when the primary is missing or over the size cap
    pub fallback: MediaKind,
}

impl Platform {
    /// Pick the platform by URL substring, YouTube first, then TikTok,
    /// Instagram and Facebook. The order is fixed so URLs that happen to
    /// contain several domains dispatch deterministically.
    #[must_use]
    pub fn classify(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        if lower.contains("youtube.com") || lower.contains("youtu.be") {
            Some(Self::Youtube)
        } else if lower.contains("tiktok.com") {
            Some(Self::TikTok)
        } else if lower.contains("instagram.com") {
            Some(Self::Instagram)
        } else if lower.contains("facebook.com") {
            Some(Self::Facebook)
        } else {
            None
        }
    }

    /// Lowercase name for logs and metrics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::TikTok => "tiktok",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
        }
    }

    /// Name used in user-facing messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::TikTok => "TikTok",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
        }
    }

    /// Fetch order for this platform. Instagram falls back to the post
    /// image (photo posts have no video stream); everything else falls
    /// back to an audio extraction.
    #[must_use]
    pub const fn profile(self) -> PlatformProfile {
        match self {
            Self::Instagram => PlatformProfile {
                primary: MediaKind::Video,
                fallback: MediaKind::Image,
            },
            Self::Youtube | Self::TikTok | Self::Facebook => PlatformProfile {
                primary: MediaKind::Video,
                fallback: MediaKind::Audio,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_matches_case_insensitively() {
        assert!(is_supported_url("https://WWW.TIKTOK.COM/@u/video/1"));
        assert!(is_supported_url("https://youtu.be/abc"));
        assert!(is_supported_url("check this https://www.instagram.com/p/x out"));
    }

    #[test]
    fn non_listed_text_is_rejected() {
        assert!(!is_supported_url("https://vimeo.com/12345"));
        assert!(!is_supported_url("hello there"));
        assert!(!is_supported_url(""));
    }

    // Substring matching accepts even non-URL garbage containing a domain.
    #[test]
    fn garbage_with_domain_substring_is_accepted() {
        assert!(is_supported_url("not a url but youtube.com anyway"));
    }

    #[test]
    fn classification_follows_fixed_precedence() {
        assert_eq!(Platform::classify("https://youtu.be/abc"), Some(Platform::Youtube));
        assert_eq!(
            Platform::classify("https://www.tiktok.com/@u/video/1"),
            Some(Platform::TikTok)
        );
        assert_eq!(
            Platform::classify("https://instagram.com/p/x"),
            Some(Platform::Instagram)
        );
        assert_eq!(
            Platform::classify("https://m.facebook.com/watch?v=1"),
            Some(Platform::Facebook)
        );
        // YouTube wins when substrings coincide
        assert_eq!(
            Platform::classify("https://youtube.com/?ref=tiktok.com"),
            Some(Platform::Youtube)
        );
        assert_eq!(Platform::classify("https://example.com"), None);
    }

    #[test]
    fn profiles_fetch_video_first() {
        for platform in [
            Platform::Youtube,
            Platform::TikTok,
            Platform::Instagram,
            Platform::Facebook,
        ] {
            assert_eq!(platform.profile().primary, MediaKind::Video);
        }
        assert_eq!(Platform::Instagram.profile().fallback, MediaKind::Image);
        assert_eq!(Platform::Youtube.profile().fallback, MediaKind::Audio);
    }
}
