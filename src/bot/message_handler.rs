//! Message Handler module for processing incoming Telegram messages

use anyhow::{anyhow, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, PhotoSize};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use crate::flow::FieldKind;
use crate::localization::t_lang;
use crate::redaction::{redact, RedactionMask};
use crate::wizard::{Input, Reply};

use super::dialogue_manager::present_reply;
use super::BotState;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "start a new post")]
    Start,
    #[command(description = "cancel the current post")]
    Cancel,
    #[command(description = "show how the bot works")]
    Help,
}

fn language_code(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_deref())
}

/// Log a failed handler and apologise to the user
async fn report_failure(
    bot: &Bot,
    user_id: UserId,
    chat_id: ChatId,
    language_code: Option<&str>,
    e: anyhow::Error,
) {
    error!(user_id = %user_id, chat_id = %chat_id, error = %e, "Failed to handle message");
    if let Err(send_err) = bot
        .send_message(chat_id, t_lang("error-generic", language_code))
        .await
    {
        error!(user_id = %user_id, chat_id = %chat_id, error = %send_err, "Failed to send apology");
    }
}

pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    Ok(bytes.to_vec())
}

/// Download a photo, archive the original, blur it and show the preview.
///
/// Returns the file id of the previewed (redacted) photo, or `None` when
/// the user has already been told what went wrong.
pub async fn redact_and_preview(
    bot: &Bot,
    state: &BotState,
    chat_id: ChatId,
    file_id: FileId,
    mask: &RedactionMask,
    language_code: Option<&str>,
) -> Result<Option<String>> {
    let bytes = match download_file(bot, file_id).await {
        Ok(bytes) => {
            debug!(chat_id = %chat_id, size = bytes.len(), "Photo downloaded");
            bytes
        }
        Err(e) => {
            error!(chat_id = %chat_id, error = %e, "Failed to download photo");
            bot.send_message(chat_id, t_lang("error-download-failed", language_code))
                .await?;
            return Ok(None);
        }
    };

    if let Some(audit_chat) = state.audit_chat {
        let original = InputFile::memory(bytes.clone()).file_name("original.jpg");
        if let Err(e) = bot.send_photo(audit_chat, original).await {
            error!(chat_id = %chat_id, error = %e, "Failed to upload original to audit chat");
        }
    }

    let mask = mask.clone();
    let processed = match tokio::task::spawn_blocking(move || redact(&bytes, &mask)).await? {
        Ok(processed) => processed,
        Err(e) => {
            warn!(chat_id = %chat_id, error = %e, "Photo could not be redacted");
            bot.send_message(chat_id, t_lang("error-image-processing", language_code))
                .await?;
            return Ok(None);
        }
    };

    let preview = bot
        .send_photo(
            chat_id,
            InputFile::memory(processed).file_name("preview.jpg"),
        )
        .await?;

    let preview_id = preview
        .photo()
        .and_then(largest_photo)
        .map(|photo| photo.file.id.0.clone())
        .ok_or_else(|| anyhow!("preview message carries no photo"))?;

    info!(chat_id = %chat_id, "Redacted preview sent");
    Ok(Some(preview_id))
}

fn largest_photo(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos.last()
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    state: &BotState,
    user_id: UserId,
    text: &str,
) -> Result<()> {
    let language_code = language_code(msg);
    debug!(user_id = %user_id, message_length = text.len(), "Received text message from user");

    if text.starts_with('/') {
        bot.send_message(msg.chat.id, t_lang("unknown-command", language_code))
            .await?;
        return Ok(());
    }

    let reply = state
        .wizard
        .submit(user_id, Input::Text(text.to_string()), language_code)
        .await;
    present_reply(bot, msg.chat.id, state, reply, language_code).await
}

async fn handle_photo_message(
    bot: &Bot,
    msg: &Message,
    state: &BotState,
    user_id: UserId,
    photos: &[PhotoSize],
) -> Result<()> {
    let language_code = language_code(msg);
    debug!(user_id = %user_id, "Received photo message from user");

    let Some(photo) = largest_photo(photos) else {
        return Ok(());
    };

    let expects_image = state.wizard.expected_kind(user_id).await == Some(FieldKind::Image);
    let file_id = match (&state.wizard.flow().redaction, expects_image) {
        (Some(mask), true) => {
            match redact_and_preview(
                bot,
                state,
                msg.chat.id,
                photo.file.id.clone(),
                mask,
                language_code,
            )
            .await?
            {
                Some(preview_id) => preview_id,
                None => return Ok(()),
            }
        }
        _ => photo.file.id.0.clone(),
    };

    let reply = state
        .wizard
        .submit(user_id, Input::Photo(file_id), language_code)
        .await;
    present_reply(bot, msg.chat.id, state, reply, language_code).await
}

pub async fn message_handler(bot: Bot, msg: Message, state: Arc<BotState>) -> Result<()> {
    let Some(user_id) = msg.from.as_ref().map(|user| user.id) else {
        return Ok(());
    };

    let result = if let Some(text) = msg.text() {
        handle_text_message(&bot, &msg, &state, user_id, text).await
    } else if let Some(photos) = msg.photo() {
        handle_photo_message(&bot, &msg, &state, user_id, photos).await
    } else {
        debug!(user_id = %user_id, "Received unsupported message type from user");
        bot.send_message(msg.chat.id, t_lang("unsupported-message", language_code(&msg)))
            .await
            .map(|_| ())
            .map_err(Into::into)
    };

    if let Err(e) = result {
        report_failure(&bot, user_id, msg.chat.id, language_code(&msg), e).await;
    }
    Ok(())
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> Result<()> {
    let Some(user_id) = msg.from.as_ref().map(|user| user.id) else {
        return Ok(());
    };
    let language_code = language_code(&msg);
    debug!(user_id = %user_id, command = ?cmd, "Received command");

    let result = async {
        match cmd {
            Command::Start => {
                let reply = state.wizard.start(user_id, language_code).await;
                if matches!(reply, Reply::Prompt { .. }) {
                    bot.send_message(msg.chat.id, t_lang("welcome", language_code))
                        .await?;
                }
                present_reply(&bot, msg.chat.id, &state, reply, language_code).await
            }
            Command::Cancel => {
                let reply = state.wizard.cancel(user_id).await;
                present_reply(&bot, msg.chat.id, &state, reply, language_code).await
            }
            Command::Help => {
                bot.send_message(msg.chat.id, t_lang("help-text", language_code))
                    .await?;
                Ok(())
            }
        }
    }
    .await;

    if let Err(e) = result {
        report_failure(&bot, user_id, msg.chat.id, language_code, e).await;
    }
    Ok(())
}
