//! Command, URL and quality-callback handlers.
//!
//! All user-visible flow lives here: fixed command replies, the URL
//! allow-list check, the quality keyboard, and the callback that drives
//! the download engine and hands its outcome to the sender.

use crate::bot::send;
use crate::download::{
    is_supported_url, DownloadOutcome, DownloadRequest, Downloader, MediaFetcher, Platform,
    QualityTier,
};
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::info;

/// Bot commands with fixed replies.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "Start the bot.")]
    Start,
    #[command(description = "Show the help message.")]
    Help,
    #[command(description = "Contact the developer.")]
    Contact,
}

const START_TEXT: &str = "Hello! I'm a media downloader bot. Send a TikTok, Instagram, \
    Facebook, or YouTube link to download videos, images, or audio (under 50MB). \
    Use /help for more info.";

const HELP_TEXT: &str = "📥 *Media Downloader Bot Help*\n\n\
    This bot downloads media (videos, images, audio) from TikTok, Instagram, \
    Facebook, and YouTube, with a 50MB size limit.\n\n\
    *Commands:*\n\
    /start - Start the bot\n\
    /help - Show this help message\n\
    /contact - Contact the developer\n\n\
    *How to Use:*\n\
    1. Send a valid URL from supported platforms.\n\
    2. Choose quality (low, medium, high) from the inline keyboard.\n\
    3. Receive the downloaded media.\n\n\
    *Supported Platforms:*\n\
    - YouTube\n- TikTok\n- Instagram\n- Facebook\n\n\
    *Note*: Files over 50MB or private content may not download.";

const CONTACT_TEXT: &str =
    "Contact the developer:\nGitHub: https://github.com/media-fetch-bot/media-fetch-bot";

const REJECTION_TEXT: &str =
    "Please send a valid TikTok, Instagram, Facebook, or YouTube URL.";

/// Reply to `/start`.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, START_TEXT).await?;
    Ok(())
}

/// Reply to `/help`.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, HELP_TEXT)
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

/// Reply to `/contact`.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn contact(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, CONTACT_TEXT)
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

/// Inline keyboard whose callback payload is `"<tier>|<url>"`. All state
/// between render and selection lives in that payload.
fn quality_keyboard(url: &str) -> InlineKeyboardMarkup {
    let row = [
        ("Low Quality", QualityTier::Low),
        ("Medium Quality", QualityTier::Medium),
        ("High Quality", QualityTier::High),
    ]
    .into_iter()
    .map(|(label, tier)| {
        InlineKeyboardButton::callback(label, format!("{}|{url}", tier.as_str()))
    })
    .collect::<Vec<_>>();

    InlineKeyboardMarkup::new([row])
}

/// Handle free-text messages: validate the URL against the allow-list and
/// render the quality choice, or reject.
///
/// # Errors
///
/// Returns an error if a reply cannot be sent.
pub async fn handle_url_message(bot: Bot, msg: Message) -> Result<()> {
    let Some(url) = msg.text() else {
        return Ok(());
    };

    if !is_supported_url(url) {
        bot.send_message(msg.chat.id, REJECTION_TEXT).await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Please select the download quality:")
        .reply_markup(quality_keyboard(url))
        .await?;
    Ok(())
}

/// Split a callback payload on the FIRST `|` only, so URLs containing
/// further `|` characters stay intact.
fn parse_payload(data: &str) -> Option<(&str, &str)> {
    data.split_once('|')
}

/// Handle a quality selection: acknowledge the callback, dispatch to the
/// platform profile and deliver the outcome.
///
/// # Errors
///
/// Returns an error if a Telegram API call fails.
pub async fn handle_quality_selection<F: MediaFetcher>(
    bot: Bot,
    q: CallbackQuery,
    downloader: Arc<Downloader<F>>,
) -> Result<()> {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(chat_id) = q.message.as_ref().map(|msg| msg.chat().id) else {
        return Ok(());
    };

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some((tier, url)) = parse_payload(data) else {
        return Ok(());
    };

    bot.send_message(
        chat_id,
        format!("Processing your request with {tier} quality..."),
    )
    .await?;

    let outcome = match Platform::classify(url) {
        Some(platform) => {
            info!(platform = platform.name(), chat_id = chat_id.0, "dispatching download");
            let request = DownloadRequest {
                url: url.to_string(),
                quality: QualityTier::parse_or_medium(tier),
            };
            downloader.download(platform, &request).await
        }
        None => DownloadOutcome::Failed("Unsupported platform.".to_string()),
    };

    send::deliver(&bot, chat_id, outcome).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn payloads(kb: &InlineKeyboardMarkup) -> Vec<String> {
        kb.inline_keyboard
            .iter()
            .flatten()
            .filter_map(|btn| match &btn.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn keyboard_encodes_tier_and_url() {
        let kb = quality_keyboard("https://youtu.be/abc");
        assert_eq!(
            payloads(&kb),
            vec![
                "low|https://youtu.be/abc",
                "medium|https://youtu.be/abc",
                "high|https://youtu.be/abc",
            ]
        );
    }

    #[test]
    fn payload_splits_on_first_delimiter_only() {
        assert_eq!(
            parse_payload("high|https://youtu.be/abc"),
            Some(("high", "https://youtu.be/abc"))
        );
        // later delimiters belong to the URL
        assert_eq!(
            parse_payload("low|https://youtu.be/a|b|c"),
            Some(("low", "https://youtu.be/a|b|c"))
        );
        assert_eq!(parse_payload("no-delimiter"), None);
    }
}
