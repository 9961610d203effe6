//! One complete acquisition run against the portal.

use crate::acwd::client::Client;
use crate::acwd::session::Session;
use crate::acwd::{auth, billing, meter, normalize, token, usage};
use crate::error::{AcquisitionError, AcwdError, Stage};
use crate::model::{Account, AcquisitionResult, DateRange, DayGap, GapReason, UsageSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Collects hourly water usage for one account.
///
/// Runs are independent: each logs in afresh and signs out at the end, and
/// nothing is cached between them.
pub struct WaterUsageCollector {
    client: Arc<Client>,
    account: Account,
    days: u32,
    concurrency: usize,
}

impl WaterUsageCollector {
    pub fn new(client: Arc<Client>, account: Account, days: u32, concurrency: usize) -> Self {
        Self {
            client,
            account,
            days: days.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// Runs token, login, meter, fetch and normalize stages, then signs out.
    ///
    /// Only the token, login and meter stages can fail the run. Failed or
    /// empty days and unparsable rows are reported on the result instead.
    pub async fn run(&self, today: NaiveDate) -> Result<AcquisitionResult, AcquisitionError> {
        let session = token::start_session(&self.client)
            .await
            .map_err(|e| stage_failed(Stage::Token, e))?;
        let session = auth::login(&self.client, session, &self.account)
            .await
            .map_err(|e| stage_failed(Stage::Login, e))?;

        let outcome = self.collect(&session, today).await;
        auth::logout(&self.client, session).await;
        outcome
    }

    async fn collect(
        &self,
        session: &Session,
        today: NaiveDate,
    ) -> Result<AcquisitionResult, AcquisitionError> {
        let meter = meter::resolve_meter(&self.client, session)
            .await
            .map_err(|e| stage_failed(Stage::Meter, e))?;

        let dates = usage::usage_window(today, self.days);
        let range = match (dates.first(), dates.last()) {
            (Some(&start), Some(&end)) => DateRange { start, end },
            _ => {
                let yesterday = today.pred_opt().unwrap_or(today);
                DateRange {
                    start: yesterday,
                    end: yesterday,
                }
            }
        };
        tracing::info!(
            meter = %meter,
            start = %range.start,
            end = %range.end,
            "Fetching hourly usage"
        );

        let (fetched, billing) = futures::join!(
            usage::fetch_days(&self.client, session, &meter, &dates, self.concurrency),
            billing::fetch_billing(&self.client, session),
        );

        let mut days = Vec::with_capacity(fetched.len());
        let mut missing_days = Vec::new();
        for outcome in fetched {
            match outcome {
                Ok(day) if day.rows.is_empty() => {
                    tracing::warn!(date = %day.date, "Portal returned no usage rows");
                    missing_days.push(DayGap {
                        date: day.date,
                        reason: GapReason::NoData,
                    });
                }
                Ok(day) => days.push(day),
                Err(err) => {
                    tracing::warn!(date = %err.date, error = %err.source, "Usage fetch failed");
                    missing_days.push(DayGap {
                        date: err.date,
                        reason: GapReason::Failed(err.source.to_string()),
                    });
                }
            }
        }

        let billing = billing.map_err(|err| {
            tracing::warn!(error = %err, "Billing snapshot unavailable");
            err.to_string()
        });

        let normalized = normalize::normalize(&days);

        Ok(AcquisitionResult::new(meter, range, normalized.records)
            .with_billing(billing)
            .with_missing_days(missing_days)
            .with_malformed(normalized.malformed))
    }
}

fn stage_failed(stage: Stage, source: AcwdError) -> AcquisitionError {
    tracing::error!(stage = %stage, error = %source, "Acquisition stage failed");
    AcquisitionError::new(stage, source)
}

#[async_trait]
impl UsageSource for WaterUsageCollector {
    async fn acquire(&self, today: NaiveDate) -> Result<AcquisitionResult, AcquisitionError> {
        self.run(today).await
    }
}
