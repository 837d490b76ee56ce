//! Configuration and settings management
//!
//! Loads settings from environment variables (and optional config files)
//! and defines the process-wide media size cap.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Hard cap on deliverable media size (50 MB).
///
/// The yt-dlp format selectors carry a best-effort `filesize<50M` bound,
/// but metadata can be missing; the on-disk check against this constant
/// is the authoritative one.
pub const MAX_MEDIA_BYTES: u64 = 50 * 1024 * 1024;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Directory for temporary download artifacts
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    /// Path to the yt-dlp binary
    #[serde(default = "default_ytdlp_bin")]
    pub ytdlp_bin: String,
}

fn default_download_dir() -> String {
    ".".to_string()
}

fn default_ytdlp_bin() -> String {
    "yt-dlp".to_string()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails, including when the
    /// required `TELEGRAM_TOKEN` is absent.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Environment::default() maps UPPER_SNAKE_CASE to snake_case,
            // so TELEGRAM_TOKEN lands in `telegram_token`
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }
}
