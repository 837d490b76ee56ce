//! Media delivery and temp-file cleanup.
//!
//! The temporary file is removed after the send attempt whether or not
//! the send succeeded; a send failure becomes a user-visible error text
//! and never skips the cleanup.

use crate::download::{DownloadOutcome, MediaKind};
use anyhow::Result;
use std::io::ErrorKind;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};
use tracing::{info, warn};

/// Deliver a download outcome to the chat.
///
/// Error outcomes are relayed verbatim. Media outcomes are dispatched
/// through the send primitive matching their kind, followed by a
/// confirmation message.
///
/// # Errors
///
/// Returns an error only if the final status message cannot be sent.
pub async fn deliver(bot: &Bot, chat_id: ChatId, outcome: DownloadOutcome) -> Result<()> {
    match outcome {
        DownloadOutcome::Failed(message) => {
            bot.send_message(chat_id, message).await?;
            Ok(())
        }
        DownloadOutcome::Media { path, kind } => {
            let sent = send_media(bot, chat_id, &path, kind).await;
            remove_artifact(&path).await;

            match sent {
                Ok(()) => {
                    info!(kind = kind.name(), chat_id = chat_id.0, "media delivered");
                    Ok(())
                }
                Err(e) => {
                    warn!(kind = kind.name(), error = %e, "media send failed");
                    bot.send_message(chat_id, format!("Error sending media: {e}"))
                        .await?;
                    Ok(())
                }
            }
        }
    }
}

/// Send the file through the primitive matching its kind and confirm.
async fn send_media(bot: &Bot, chat_id: ChatId, path: &Path, kind: MediaKind) -> Result<()> {
    let file = InputFile::file(path.to_path_buf());
    match kind {
        MediaKind::Image => {
            bot.send_photo(chat_id, file).await?;
            bot.send_message(chat_id, "Image sent successfully!").await?;
        }
        MediaKind::Video => {
            bot.send_video(chat_id, file).await?;
            bot.send_message(chat_id, "Video sent successfully!").await?;
        }
        MediaKind::Audio => {
            bot.send_audio(chat_id, file).await?;
            bot.send_message(chat_id, "Audio sent successfully!").await?;
        }
    }
    Ok(())
}

/// Remove the temporary artifact; a file that is already gone is fine.
async fn remove_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove artifact"),
    }
}
