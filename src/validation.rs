//! Field validators for wizard text answers.
//!
//! Every validator is a total predicate over the raw message text. No
//! trimming or normalisation happens here: what the user typed is what
//! gets checked and, if accepted, what gets stored.

use serde::{Deserialize, Serialize};

use crate::field_patterns::{DATE_TIME_REGEX, ODDS_REGEX, SCORE_REGEX, URL_REGEX};

/// Validation rule attached to a text field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// `DD-MM-YYYY HH:MM:SS`
    DateTime,
    /// Decimal odds such as `1.8` or `3`
    Odds,
    /// Match score such as `2-0`
    Score,
    /// `http://` or `https://` link
    Url,
    /// Anything goes
    #[default]
    FreeText,
}

impl Validator {
    /// Check raw input against this rule
    pub fn validate(&self, text: &str) -> bool {
        match self {
            Validator::DateTime => validate_date_time(text),
            Validator::Odds => validate_odds(text),
            Validator::Score => validate_score(text),
            Validator::Url => validate_url(text),
            Validator::FreeText => true,
        }
    }

    /// Localization id of the corrective prompt shown on rejection
    pub fn error_key(&self) -> &'static str {
        match self {
            Validator::DateTime => "invalid-date-time",
            Validator::Odds => "invalid-odds",
            Validator::Score => "invalid-score",
            Validator::Url => "invalid-url",
            Validator::FreeText => "invalid-text",
        }
    }
}

pub fn validate_date_time(text: &str) -> bool {
    DATE_TIME_REGEX.is_match(text)
}

pub fn validate_odds(text: &str) -> bool {
    ODDS_REGEX.is_match(text)
}

pub fn validate_score(text: &str) -> bool {
    SCORE_REGEX.is_match(text)
}

pub fn validate_url(text: &str) -> bool {
    URL_REGEX.is_match(text)
}
