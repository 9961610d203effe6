use crate::error::AcquisitionError;
use crate::model::AcquisitionResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of hourly water usage for one account.
///
/// Implementors run a complete acquisition (login, meter resolution, per-day
/// fetch, normalization, logout) per call.
///
/// Callers must not run two acquisitions for the same account at once: a
/// second login can invalidate the first session's cookie.
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Acquires usage for the configured window ending the day before `today`.
    async fn acquire(&self, today: NaiveDate) -> Result<AcquisitionResult, AcquisitionError>;
}
