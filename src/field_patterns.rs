//! # Field Patterns Module
//!
//! Regex patterns used by the wizard's field validators.

use lazy_static::lazy_static;
use regex::Regex;

// DD-MM-YYYY HH:MM:SS, zero-padded, 24-hour clock
pub const DATE_TIME_PATTERN: &str =
    r"^(0[1-9]|[12][0-9]|3[01])-(0[1-9]|1[0-2])-[0-9]{4} ([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$";
pub const ODDS_PATTERN: &str = r"^[0-9]+(\.[0-9]+)?$";
pub const SCORE_PATTERN: &str = r"^[0-9]+-[0-9]+$";
pub const URL_PATTERN: &str = r"^https?://\S+$";

lazy_static! {
    pub static ref DATE_TIME_REGEX: Regex =
        Regex::new(DATE_TIME_PATTERN).expect("Date/time pattern should be valid");
    pub static ref ODDS_REGEX: Regex = Regex::new(ODDS_PATTERN).expect("Odds pattern should be valid");
    pub static ref SCORE_REGEX: Regex =
        Regex::new(SCORE_PATTERN).expect("Score pattern should be valid");
    pub static ref URL_REGEX: Regex = Regex::new(URL_PATTERN).expect("URL pattern should be valid");
}
