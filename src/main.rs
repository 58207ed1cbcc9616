use anyhow::{Context, Result};
use post_wizard::bot::{self, BotState, Command};
use post_wizard::config::{BotConfig, FlowSource};
use post_wizard::flow::FlowDefinition;
use post_wizard::localization::init_localization;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_flow(source: &FlowSource) -> Result<FlowDefinition> {
    let flow = match source {
        FlowSource::Builtin(name) => FlowDefinition::builtin(name)?,
        FlowSource::File(path) => FlowDefinition::from_json_file(path)
            .with_context(|| format!("failed to load flow from {}", path.display()))?,
    };
    Ok(flow)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting post wizard Telegram bot");

    // A missing token aborts here, before any update is served
    let config = BotConfig::from_env().context("failed to load configuration")?;

    init_localization()?;

    let flow = load_flow(&config.flow)?;
    if config.access.is_open() {
        warn!("ALLOWED_USER_IDS is empty, every user can run the wizard");
    }
    info!(
        flow = %flow.name,
        fields = flow.field_count(),
        redaction = flow.redaction.is_some(),
        allowed_users = config.access.len(),
        audit_chat = config.audit_chat.is_some(),
        "Configuration loaded"
    );

    let bot = Bot::new(config.token.clone());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let state = Arc::new(BotState::new(&config, flow));

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
