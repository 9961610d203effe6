//! Current bill summary from the billing dashboard.

use crate::acwd::client::Client;
use crate::acwd::envelope;
use crate::acwd::helper::Scalar;
use crate::acwd::session::Session;
use crate::error::{AcwdError, Result};
use crate::model::BillingSnapshot;
use serde_derive::{Deserialize, Serialize};

pub const BILLING_PATH: &str = "BillDashboard.aspx/LoadBilling";

#[derive(Serialize, Debug)]
struct BillingRequest {
    #[serde(rename = "IsDashboard")]
    is_dashboard: u8,
}

#[derive(Deserialize, Debug)]
struct BillingPayload {
    #[serde(rename = "BillDue")]
    bill_due: Option<Scalar>,
    #[serde(rename = "TotalBill")]
    total_bill: Option<Scalar>,
}

/// Fetches the bill summary. Any failure comes back as
/// `AcwdError::BillingUnavailable`.
pub async fn fetch_billing(client: &Client, session: &Session) -> Result<BillingSnapshot> {
    let fetch = async {
        let response = client
            .post_json(BILLING_PATH, session, &BillingRequest { is_dashboard: 1 })
            .await?;
        // billing is the one endpoint whose payload is not string-encoded
        let payload: BillingPayload = envelope::decode_direct(&response.body)?;
        snapshot_from(payload)
    };
    fetch
        .await
        .map_err(|err| match err {
            AcwdError::BillingUnavailable(message) => AcwdError::BillingUnavailable(message),
            other => AcwdError::BillingUnavailable(other.to_string()),
        })
}

fn snapshot_from(payload: BillingPayload) -> Result<BillingSnapshot> {
    match (payload.bill_due, payload.total_bill) {
        (None, None) => Err(AcwdError::BillingUnavailable(
            "billing payload has neither BillDue nor TotalBill".to_string(),
        )),
        (due, total) => Ok(BillingSnapshot {
            due_date: due.map(Scalar::into_text).unwrap_or_default(),
            amount_due: total.map(Scalar::into_text).unwrap_or_default(),
        }),
    }
}
