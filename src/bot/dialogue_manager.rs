//! Dialogue Manager module: turns wizard replies into Telegram messages
//!
//! Replies to plain messages are sent as new messages. Replies to button
//! presses edit the message that carried the buttons, so the summary turns
//! into the field chooser and back in place.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId, Recipient};
use tracing::{debug, error, info};

use crate::composer::Composed;
use crate::localization::t_lang;
use crate::wizard::Reply;

use super::ui_builder::{create_confirmation_keyboard, create_field_chooser_keyboard};
use super::BotState;

/// Localization id of the notice shown for terminal replies
fn notice_key(reply: &Reply) -> Option<&'static str> {
    match reply {
        Reply::Cancelled => Some("cancelled"),
        Reply::NothingToCancel => Some("nothing-to-cancel"),
        Reply::Expired => Some("session-expired"),
        Reply::NoSession => Some("no-session"),
        Reply::Unauthorized => Some("unauthorized"),
        _ => None,
    }
}

/// Send the summary: the photo first if there is one, then the text with
/// the confirmation buttons
pub async fn send_summary(
    bot: &Bot,
    chat_id: ChatId,
    summary: Composed,
    language_code: Option<&str>,
) -> Result<()> {
    if let Some(photo) = summary.photo {
        bot.send_photo(chat_id, InputFile::file_id(FileId(photo)))
            .await?;
    }
    bot.send_message(chat_id, summary.text)
        .reply_markup(create_confirmation_keyboard(language_code))
        .await?;
    Ok(())
}

/// Post the composed message to the target channel
pub async fn publish_post(bot: &Bot, target: &Recipient, post: &Composed) -> Result<()> {
    match &post.photo {
        Some(photo) => {
            bot.send_photo(target.clone(), InputFile::file_id(FileId(photo.clone())))
                .caption(post.text.clone())
                .await?;
        }
        None => {
            bot.send_message(target.clone(), post.text.clone()).await?;
        }
    }
    info!(channel = ?target, has_photo = post.photo.is_some(), "Post published");
    Ok(())
}

/// Publish and report the outcome to the user.
///
/// Returns the text to show; a failed post is logged and turned into an
/// apology, it is not retried.
async fn publish_and_report(
    bot: &Bot,
    state: &BotState,
    post: &Composed,
    language_code: Option<&str>,
) -> String {
    match publish_post(bot, &state.target_channel, post).await {
        Ok(()) => t_lang("post-published", language_code),
        Err(e) => {
            error!(error = %e, "Failed to publish post");
            t_lang("error-generic", language_code)
        }
    }
}

/// Show a reply to a text, photo or command message
pub async fn present_reply(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    reply: Reply,
    language_code: Option<&str>,
) -> Result<()> {
    match reply {
        Reply::Prompt { text, .. } | Reply::Rejected { text } => {
            bot.send_message(chat_id, text).await?;
        }
        Reply::Summary(summary) => {
            send_summary(bot, chat_id, summary, language_code).await?;
        }
        Reply::FieldChooser(choices) => {
            bot.send_message(chat_id, t_lang("choose-field", language_code))
                .reply_markup(create_field_chooser_keyboard(&choices, language_code))
                .await?;
        }
        Reply::Publish(post) => {
            let outcome = publish_and_report(bot, state, &post, language_code).await;
            bot.send_message(chat_id, outcome).await?;
        }
        Reply::Ignored => {
            debug!(chat_id = %chat_id, "Nothing to show");
        }
        other => {
            if let Some(key) = notice_key(&other) {
                bot.send_message(chat_id, t_lang(key, language_code)).await?;
            }
        }
    }
    Ok(())
}

/// Show a reply to a button press by editing the message that carried it
pub async fn present_callback_reply(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    reply: Reply,
    language_code: Option<&str>,
) -> Result<()> {
    match reply {
        Reply::Prompt { text, .. } | Reply::Rejected { text } => {
            bot.edit_message_text(chat_id, message_id, text).await?;
        }
        Reply::Summary(summary) => {
            bot.edit_message_text(chat_id, message_id, summary.text)
                .reply_markup(create_confirmation_keyboard(language_code))
                .await?;
        }
        Reply::FieldChooser(choices) => {
            bot.edit_message_text(chat_id, message_id, t_lang("choose-field", language_code))
                .reply_markup(create_field_chooser_keyboard(&choices, language_code))
                .await?;
        }
        Reply::Publish(post) => {
            let outcome = publish_and_report(bot, state, &post, language_code).await;
            bot.edit_message_text(chat_id, message_id, outcome).await?;
        }
        Reply::Cancelled => {
            bot.edit_message_text(chat_id, message_id, t_lang("post-cancelled", language_code))
                .await?;
        }
        Reply::Ignored => {
            debug!(chat_id = %chat_id, "Ignoring selection");
        }
        other => {
            if let Some(key) = notice_key(&other) {
                bot.edit_message_text(chat_id, message_id, t_lang(key, language_code))
                    .await?;
            }
        }
    }
    Ok(())
}
