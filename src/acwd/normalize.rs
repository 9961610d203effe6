//! Turns raw per-day rows into one flat usage series.

use crate::acwd::helper::parse_row_instant;
use crate::acwd::usage::{DayUsage, RawUsageRow};
use crate::error::MalformedRecordError;
use crate::model::UsageRecord;
use serde_json::Value;

/// Records that parsed, and the rows that did not.
#[derive(Debug, Default, PartialEq)]
pub struct Normalized {
    pub records: Vec<UsageRecord>,
    pub malformed: Vec<MalformedRecordError>,
}

/// Concatenates days in the order given, oldest first. Rows normally arrive
/// hour-ordered; if they do not, the series is stably re-sorted by timestamp.
pub fn normalize(days: &[DayUsage]) -> Normalized {
    let mut normalized = Normalized::default();
    for day in days {
        for row in &day.rows {
            match normalize_row(row) {
                Ok(record) => normalized.records.push(record),
                Err(err) => {
                    tracing::warn!(date = %day.date, error = %err, "Dropping malformed usage row");
                    normalized.malformed.push(err);
                }
            }
        }
    }
    if !is_ordered(&normalized.records) {
        tracing::warn!("Usage rows arrived out of order, sorting by timestamp");
        normalized.records.sort_by_key(|record| record.timestamp);
    }
    normalized
}

fn is_ordered(records: &[UsageRecord]) -> bool {
    records
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp)
}

pub fn normalize_row(row: &RawUsageRow) -> Result<UsageRecord, MalformedRecordError> {
    let malformed = |message: &str| {
        MalformedRecordError::new(
            field_text(&row.usage_date),
            field_text(&row.hourly),
            message,
        )
    };
    let (usage_date, hourly) = match (&row.usage_date, &row.hourly) {
        (Some(Value::String(usage_date)), Some(Value::String(hourly))) => (usage_date, hourly),
        _ => return Err(malformed("usage date and hour must both be text")),
    };

    let timestamp = parse_row_instant(usage_date, hourly).map_err(|e| malformed(&e.to_string()))?;
    let gallons = match &row.usage_value {
        // the portal omits the value for hours with no usage
        None => 0.0,
        Some(value) => parse_gallons(value).ok_or_else(|| malformed("usage value is not a number"))?,
    };
    if !gallons.is_finite() || gallons < 0.0 {
        return Err(malformed("usage value is negative or not finite"));
    }

    Ok(UsageRecord { timestamp, gallons })
}

/// Raw field text for error reports.
fn field_text(field: &Option<Value>) -> String {
    match field {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn parse_gallons(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}
