//! # Configuration Module
//!
//! Process configuration read from the environment (a `.env` file is loaded
//! first by `main`).
//!
//! | Variable             | Meaning                                            |
//! |----------------------|----------------------------------------------------|
//! | `TELEGRAM_BOT_TOKEN` | Bot credential, required                           |
//! | `TARGET_CHANNEL`     | Channel posts go to: numeric id or `@username`     |
//! | `ALLOWED_USER_IDS`   | Comma-separated user ids; empty allows everyone    |
//! | `AUDIT_CHAT_ID`      | Chat receiving original uploads before redaction  |
//! | `WIZARD_FLOW`        | Built-in flow name, `signal` (default) or `redaction` |
//! | `WIZARD_FLOW_FILE`   | JSON flow definition, overrides `WIZARD_FLOW`      |

use std::collections::HashSet;
use std::path::PathBuf;
use teloxide::types::{ChatId, Recipient, UserId};

use crate::errors::ConfigError;

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const TARGET_CHANNEL_VAR: &str = "TARGET_CHANNEL";
pub const ALLOWED_USERS_VAR: &str = "ALLOWED_USER_IDS";
pub const AUDIT_CHAT_VAR: &str = "AUDIT_CHAT_ID";
pub const FLOW_VAR: &str = "WIZARD_FLOW";
pub const FLOW_FILE_VAR: &str = "WIZARD_FLOW_FILE";
pub const DEFAULT_FLOW: &str = "signal";

/// Users permitted to run the wizard
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessList {
    allowed: HashSet<UserId>,
}

impl AccessList {
    /// Access list that lets every user through
    pub fn open() -> Self {
        Self::default()
    }

    pub fn new(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            allowed: users.into_iter().collect(),
        }
    }

    /// An empty list allows everyone
    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn is_allowed(&self, user: UserId) -> bool {
        self.is_open() || self.allowed.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

/// Where the wizard definition comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowSource {
    Builtin(String),
    File(PathBuf),
}

/// Complete bot configuration
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub token: String,
    pub target_channel: Recipient,
    pub access: AccessList,
    pub audit_chat: Option<ChatId>,
    pub flow: FlowSource,
}

impl BotConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get(TOKEN_VAR).ok_or(ConfigError::Missing(TOKEN_VAR))?;

        let target_channel = get(TARGET_CHANNEL_VAR)
            .ok_or(ConfigError::Missing(TARGET_CHANNEL_VAR))
            .and_then(|value| parse_recipient(TARGET_CHANNEL_VAR, &value))?;

        let access = match get(ALLOWED_USERS_VAR) {
            Some(value) => parse_user_ids(ALLOWED_USERS_VAR, &value)?,
            None => AccessList::open(),
        };

        let audit_chat = get(AUDIT_CHAT_VAR)
            .map(|value| parse_chat_id(AUDIT_CHAT_VAR, &value))
            .transpose()?;

        let flow = match get(FLOW_FILE_VAR) {
            Some(path) => FlowSource::File(PathBuf::from(path.trim())),
            None => FlowSource::Builtin(
                get(FLOW_VAR)
                    .map(|v| v.trim().to_lowercase())
                    .unwrap_or_else(|| DEFAULT_FLOW.to_string()),
            ),
        };

        Ok(Self {
            token,
            target_channel,
            access,
            audit_chat,
            flow,
        })
    }
}

/// Parse `@username` or a numeric chat id
pub fn parse_recipient(key: &'static str, value: &str) -> Result<Recipient, ConfigError> {
    let value = value.trim();
    if value.starts_with('@') && value.len() > 1 {
        Ok(Recipient::ChannelUsername(value.to_string()))
    } else {
        parse_chat_id(key, value).map(Recipient::Id)
    }
}

pub fn parse_chat_id(key: &'static str, value: &str) -> Result<ChatId, ConfigError> {
    value
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
}

/// Parse a comma-separated list of numeric user ids
pub fn parse_user_ids(key: &'static str, value: &str) -> Result<AccessList, ConfigError> {
    let users = value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>().map(UserId).map_err(|_| ConfigError::Invalid {
                key,
                value: part.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AccessList::new(users))
}
