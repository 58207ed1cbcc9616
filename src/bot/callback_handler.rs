//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, warn};

use crate::localization::t_lang;
use crate::wizard::Selection;

use super::dialogue_manager::present_callback_reply;
use super::BotState;

/// Handle callback queries from the summary and field chooser keyboards
pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    // Answered before any network-bound work
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let language_code = q.from.language_code.as_deref();

    let Some(selection) = q.data.as_deref().and_then(|data| data.parse::<Selection>().ok()) else {
        warn!(user_id = %q.from.id, data = ?q.data, "Unrecognised callback data");
        return Ok(());
    };
    let Some(message) = &q.message else {
        debug!(user_id = %q.from.id, "Callback without message, ignoring");
        return Ok(());
    };
    let chat_id = message.chat().id;

    let reply = state.wizard.select(q.from.id, selection, language_code).await;
    debug!(user_id = %q.from.id, ?selection, reply = ?reply, "Selection handled");

    if let Err(e) =
        present_callback_reply(&bot, chat_id, message.id(), &state, reply, language_code).await
    {
        error!(user_id = %q.from.id, error = %e, "Failed to present selection result");
        if let Err(send_err) = bot
            .send_message(chat_id, t_lang("error-generic", language_code))
            .await
        {
            error!(user_id = %q.from.id, error = %send_err, "Failed to send apology");
        }
    }

    Ok(())
}
