//! Telegram bot that fetches media from social platforms via yt-dlp.
//!
//! The bot accepts a TikTok/Instagram/Facebook/YouTube link, offers three
//! quality tiers on an inline keyboard, downloads the media with yt-dlp
//! and relays it back as a photo, video or audio message.

/// Telegram command, message and callback handling
pub mod bot;
/// Configuration and settings management
pub mod config;
/// Download engine and yt-dlp integration
pub mod download;
