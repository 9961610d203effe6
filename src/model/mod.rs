//! Model definitions for ACWD water usage acquisition.
//!
//! Provides the credentials, meter, usage record and result types a run
//! produces, plus the trait the driver calls to obtain them.

pub mod traits;
pub mod types;

pub use traits::UsageSource;
pub use types::{
    Account, AcquisitionResult, BillingSnapshot, DateRange, DayGap, GapReason,
    Meter, UsageRecord, DAY_LABEL_FORMAT,
};
