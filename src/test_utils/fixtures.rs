//! Test fixtures and common test data.
//!
//! Payload builders produce bodies in the portal's own envelope so tests can
//! exercise the real decoding path.

use chrono::NaiveDate;

/// Common test data constants.
pub mod constants {
    pub const USERNAME: &str = "jdoe@example.com";
    pub const PASSWORD: &str = "hunter2";

    /// Anti-forgery token embedded in the landing page.
    pub const TOKEN: &str = "Zx9-test-csrf-token";

    pub const SESSION_ID: &str = "abc123sessionid";
}

/// Test dates. Everything is pinned to October 2026.
pub mod dates {
    use super::*;

    /// A day of October 2026.
    pub fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    /// The reference "today" for runs.
    pub fn today() -> NaiveDate {
        day(16)
    }
}

/// Sample domain values.
pub mod samples {
    use super::dates;
    use crate::model::{BillingSnapshot, DateRange, Meter, UsageRecord};

    pub fn ami_meter() -> Meter {
        Meter {
            number: "M-200".to_string(),
            is_ami: true,
        }
    }

    /// October 13 to 15, the window of a three-day run on `dates::today()`.
    pub fn range() -> DateRange {
        DateRange {
            start: dates::day(13),
            end: dates::day(15),
        }
    }

    pub fn record(day: u32, hour: u32, gallons: f64) -> UsageRecord {
        UsageRecord {
            timestamp: dates::day(day).and_hms_opt(hour, 0, 0).unwrap(),
            gallons,
        }
    }

    pub fn billing() -> BillingSnapshot {
        BillingSnapshot {
            due_date: "11/02/2026".to_string(),
            amount_due: "84.12".to_string(),
        }
    }
}

/// Response bodies as the portal sends them.
pub mod payloads {
    use serde_json::{json, Value};

    /// Wraps a payload in the `{"d": "<encoded json>"}` envelope.
    pub fn wrap(payload: &Value) -> String {
        json!({ "d": payload.to_string() }).to_string()
    }

    pub fn landing_page(token: &str) -> String {
        format!(
            r#"<html><body>
                <form id="form1" method="post" action="default.aspx">
                    <input type="hidden" name="hdnCSRFToken" id="hdnCSRFToken" value="{}" />
                    <input type="text" id="txtLogin" />
                    <input type="password" id="txtpwd" />
                </form>
            </body></html>"#,
            token
        )
    }

    /// A login response listing one identity per username.
    pub fn login_body(usernames: &[&str]) -> String {
        let identities: Vec<Value> = usernames
            .iter()
            .enumerate()
            .map(|(i, username)| {
                json!({
                    "UserName": username,
                    "AccountNumber": format!("10000{}", i),
                    "Name": "Test Customer"
                })
            })
            .collect();
        wrap(&Value::Array(identities))
    }

    pub fn meters_body(meters: &[(&str, bool)]) -> String {
        let details: Vec<Value> = meters
            .iter()
            .map(|(number, is_ami)| json!({ "MeterNumber": number, "IsAMI": is_ami }))
            .collect();
        wrap(&json!({ "MeterDetails": details }))
    }

    /// Hourly rows for one day, each `(hour label, gallons)`.
    pub fn usage_body(label: &str, rows: &[(&str, f64)]) -> String {
        let rows: Vec<Value> = rows
            .iter()
            .map(|(hourly, gallons)| {
                json!({ "UsageDate": label, "Hourly": hourly, "UsageValue": gallons })
            })
            .collect();
        wrap(&json!({ "objUsageGenerationResultSetTwo": rows }))
    }

    /// Billing is the one response whose `d` is not string-encoded.
    pub fn billing_body(due: &str, amount: Value) -> String {
        json!({ "d": { "BillDue": due, "TotalBill": amount } }).to_string()
    }
}
