//! # Post Wizard Telegram Bot
//!
//! A Telegram bot that walks a user through a short wizard (photo and text
//! answers, validated per field), shows a summary with confirm and edit
//! buttons, and posts the composed result to a channel. Photos can be
//! redacted with a fixed blur mask before they are previewed and posted.

pub mod bot;
pub mod composer;
pub mod config;
pub mod errors;
pub mod field_patterns;
pub mod flow;
pub mod localization;
pub mod redaction;
pub mod session;
pub mod validation;
pub mod wizard;
