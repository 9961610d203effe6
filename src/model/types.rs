use crate::error::MalformedRecordError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde_derive::Serialize;
use std::fmt;

/// Textual day format the portal expects and echoes back, e.g. `October 14, 2026`.
pub const DAY_LABEL_FORMAT: &str = "%B %d, %Y";

/// Portal login credentials, fixed for the lifetime of a run.
#[derive(Clone)]
pub struct Account {
    username: String,
    password: String,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A registered water meter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meter {
    pub number: String,
    /// Advanced metering infrastructure: the meter reports hourly data.
    pub is_ami: bool,
}

impl fmt::Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.number)
    }
}

/// One hour of water usage.
///
/// `timestamp` is the start of the hour on the portal's wall clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    pub timestamp: NaiveDateTime,
    pub gallons: f64,
}

impl UsageRecord {
    /// Pins the wall-clock timestamp to the local time zone. Returns `None`
    /// for hours skipped by a daylight-saving transition.
    pub fn local_timestamp(&self) -> Option<DateTime<Local>> {
        Local.from_local_datetime(&self.timestamp).earliest()
    }
}

/// Current bill summary from the billing dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingSnapshot {
    pub due_date: String,
    pub amount_due: String,
}

/// Inclusive range of requested days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn start_label(&self) -> String {
        self.start.format(DAY_LABEL_FORMAT).to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format(DAY_LABEL_FORMAT).to_string()
    }
}

/// Why a requested day contributed no records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum GapReason {
    /// The usage request failed.
    Failed(String),
    /// The portal answered but had no rows for the day.
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGap {
    pub date: NaiveDate,
    pub reason: GapReason,
}

/// Running total at one point of the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub timestamp: NaiveDateTime,
    pub gallons: f64,
    pub sum: f64,
}

/// Everything one acquisition run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionResult {
    meter: Meter,
    range: DateRange,
    records: Vec<UsageRecord>,
    billing: Option<BillingSnapshot>,
    billing_error: Option<String>,
    missing_days: Vec<DayGap>,
    malformed: Vec<MalformedRecordError>,
}

impl AcquisitionResult {
    pub fn new(meter: Meter, range: DateRange, records: Vec<UsageRecord>) -> Self {
        Self {
            meter,
            range,
            records,
            billing: None,
            billing_error: None,
            missing_days: Vec::new(),
            malformed: Vec::new(),
        }
    }

    pub fn with_billing(mut self, billing: Result<BillingSnapshot, String>) -> Self {
        match billing {
            Ok(snapshot) => self.billing = Some(snapshot),
            Err(err) => self.billing_error = Some(err),
        }
        self
    }

    pub fn with_missing_days(mut self, missing_days: Vec<DayGap>) -> Self {
        self.missing_days = missing_days;
        self
    }

    pub fn with_malformed(mut self, malformed: Vec<MalformedRecordError>) -> Self {
        self.malformed = malformed;
        self
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Usage records, oldest first.
    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    pub fn billing(&self) -> Option<&BillingSnapshot> {
        self.billing.as_ref()
    }

    pub fn billing_error(&self) -> Option<&str> {
        self.billing_error.as_deref()
    }

    /// Requested days that yielded no records.
    pub fn missing_days(&self) -> &[DayGap] {
        &self.missing_days
    }

    /// Rows dropped during normalization.
    pub fn malformed(&self) -> &[MalformedRecordError] {
        &self.malformed
    }

    /// False when any requested day or row is missing from the series.
    pub fn is_complete(&self) -> bool {
        self.missing_days.is_empty() && self.malformed.is_empty()
    }

    pub fn total_gallons(&self) -> f64 {
        self.records.iter().map(|r| r.gallons).sum()
    }

    pub fn cumulative(&self) -> Vec<CumulativePoint> {
        let mut sum = 0.0;
        self.records
            .iter()
            .map(|record| {
                sum += record.gallons;
                CumulativePoint {
                    timestamp: record.timestamp,
                    gallons: record.gallons,
                    sum,
                }
            })
            .collect()
    }
}
