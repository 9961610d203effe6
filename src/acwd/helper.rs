//! Helpers for reading portal markup and the portal's date and value formats.

use crate::error::{AcwdError, Result};
use crate::model::DAY_LABEL_FORMAT;
use chrono::{NaiveDate, NaiveDateTime};
use scraper::Selector;
use serde_derive::Deserialize;

/// Format of a usage row's `UsageDate` and `Hourly` fields joined by a space,
/// e.g. `October 14, 2026 01:00 PM`.
pub const ROW_INSTANT_FORMAT: &str = "%B %d, %Y %I:%M %p";

/// Creates a CSS selector from a string.
///
/// Selectors are fixed strings, so a parse failure means the selector itself
/// is wrong; it is reported as a layout problem all the same.
pub fn html_selector(selector: &str) -> Result<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Ok(s),
        Err(e) => Err(AcwdError::protocol_shape(format!(
            "invalid selector '{}': {}",
            selector, e
        ))),
    }
}

/// Formats a day the way the usage endpoint expects it.
pub fn day_label(date: NaiveDate) -> String {
    date.format(DAY_LABEL_FORMAT).to_string()
}

/// Joins a row's date and hour strings into a single wall-clock instant.
pub fn parse_row_instant(
    usage_date: &str,
    hourly: &str,
) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(
        &format!("{} {}", usage_date.trim(), hourly.trim()),
        ROW_INSTANT_FORMAT,
    )
}

/// A JSON scalar the portal sends as either a string or a number.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
        }
    }
}
