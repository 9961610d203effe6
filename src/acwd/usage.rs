//! Per-day hourly usage requests.

use crate::acwd::client::Client;
use crate::acwd::envelope;
use crate::acwd::helper::day_label;
use crate::acwd::session::Session;
use crate::error::{AcwdError, FetchError};
use crate::model::Meter;
use chrono::{Days, NaiveDate};
use futures::stream::{self, StreamExt};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

pub const USAGE_PATH: &str = "Usages.aspx/LoadWaterUsage";

/// Body of the usage call. `Type` G with `Mode` H asks for hourly
/// consumption; the remaining fields are the dashboard's defaults.
#[derive(Serialize, Debug)]
struct UsageRequest<'a> {
    #[serde(rename = "Type")]
    usage_type: &'static str,
    #[serde(rename = "Mode")]
    mode: &'static str,
    #[serde(rename = "strDate")]
    str_date: String,
    #[serde(rename = "hourlyType")]
    hourly_type: &'static str,
    #[serde(rename = "seasonId")]
    season_id: u32,
    #[serde(rename = "weatherOverlay")]
    weather_overlay: u32,
    usageyear: &'static str,
    #[serde(rename = "MeterNumber")]
    meter_number: &'a str,
    #[serde(rename = "DateFromDaily")]
    date_from_daily: &'static str,
    #[serde(rename = "DateToDaily")]
    date_to_daily: &'static str,
    #[serde(rename = "isNoDashboard")]
    is_no_dashboard: bool,
}

impl<'a> UsageRequest<'a> {
    fn hourly(meter: &'a Meter, date: NaiveDate) -> Self {
        Self {
            usage_type: "G",
            mode: "H",
            str_date: day_label(date),
            hourly_type: "H",
            season_id: 0,
            weather_overlay: 0,
            usageyear: "",
            meter_number: &meter.number,
            date_from_daily: "",
            date_to_daily: "",
            is_no_dashboard: true,
        }
    }
}

#[derive(Deserialize, Debug)]
struct UsagePayload {
    #[serde(rename = "objUsageGenerationResultSetTwo")]
    rows: Option<Vec<RawUsageRow>>,
}

/// One hourly row as the portal sends it. Fields stay untyped so a single
/// bad row is rejected during normalization instead of failing the day.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawUsageRow {
    #[serde(rename = "UsageDate")]
    pub usage_date: Option<Value>,
    #[serde(rename = "Hourly")]
    pub hourly: Option<Value>,
    #[serde(rename = "UsageValue")]
    pub usage_value: Option<Value>,
}

/// The rows returned for one requested day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayUsage {
    pub date: NaiveDate,
    pub rows: Vec<RawUsageRow>,
}

/// The `days` most recent full days before `today`, oldest first.
pub fn usage_window(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (1..=days)
        .rev()
        .filter_map(|k| today.checked_sub_days(Days::new(u64::from(k))))
        .collect()
}

/// Fetches one day's hourly rows. An absent row list means no data.
pub async fn fetch_day(
    client: &Client,
    session: &Session,
    meter: &Meter,
    date: NaiveDate,
) -> Result<DayUsage, FetchError> {
    let fetch = async {
        let response = client
            .post_json(USAGE_PATH, session, &UsageRequest::hourly(meter, date))
            .await?;
        let payload: UsagePayload = envelope::decode_encoded(&response.body)?;
        Ok::<_, AcwdError>(payload.rows.unwrap_or_default())
    };
    match fetch.await {
        Ok(rows) => {
            tracing::debug!(date = %date, rows = rows.len(), "Fetched usage");
            Ok(DayUsage { date, rows })
        }
        Err(source) => Err(FetchError { date, source }),
    }
}

/// Fetches every date with up to `concurrency` requests in flight. Results
/// come back in the order of `dates`, whatever order the requests finish in.
pub async fn fetch_days(
    client: &Client,
    session: &Session,
    meter: &Meter,
    dates: &[NaiveDate],
    concurrency: usize,
) -> Vec<Result<DayUsage, FetchError>> {
    stream::iter(dates.iter().copied())
        .map(|date| fetch_day(client, session, meter, date))
        .buffered(concurrency.max(1))
        .collect()
        .await
}
