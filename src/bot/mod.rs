//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles commands, text and photo messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards
//! - `dialogue_manager`: Turns wizard replies into Telegram messages

pub mod callback_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

use teloxide::dispatching::{HandlerExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Recipient;

use crate::config::BotConfig;
use crate::flow::FlowDefinition;
use crate::wizard::Wizard;

pub use callback_handler::callback_handler;
pub use message_handler::{command_handler, message_handler, Command};

/// Everything the handlers share, injected through the dispatcher
pub struct BotState {
    pub wizard: Wizard,
    /// Channel receiving confirmed posts
    pub target_channel: Recipient,
    /// Chat receiving original photos before redaction
    pub audit_chat: Option<ChatId>,
}

impl BotState {
    pub fn new(config: &BotConfig, flow: FlowDefinition) -> Self {
        Self {
            wizard: Wizard::new(flow, config.access.clone()),
            target_channel: config.target_channel.clone(),
            audit_chat: config.audit_chat,
        }
    }
}

/// Dispatch tree: commands first, then other messages, then button presses
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let message_branch = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(dptree::endpoint(message_handler));

    dptree::entry()
        .branch(message_branch)
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}
