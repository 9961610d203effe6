//! Resolution of the account's water meter.

use crate::acwd::client::Client;
use crate::acwd::envelope;
use crate::acwd::helper::Scalar;
use crate::acwd::session::Session;
use crate::error::{AcwdError, Result};
use crate::model::Meter;
use serde_derive::{Deserialize, Serialize};

pub const METER_PATH: &str = "Usages.aspx/BindMultiMeter";

#[derive(Serialize, Debug)]
struct MeterRequest {
    #[serde(rename = "MeterType")]
    meter_type: &'static str,
}

#[derive(Deserialize, Debug)]
struct MeterPayload {
    #[serde(rename = "MeterDetails")]
    meter_details: Option<Vec<MeterDetail>>,
}

#[derive(Deserialize, Debug)]
struct MeterDetail {
    #[serde(rename = "MeterNumber")]
    meter_number: Option<Scalar>,
    #[serde(rename = "IsAMI")]
    is_ami: Option<bool>,
}

/// Lists the account's water meters and picks one.
pub async fn resolve_meter(client: &Client, session: &Session) -> Result<Meter> {
    let response = client
        .post_json(METER_PATH, session, &MeterRequest { meter_type: "W" })
        .await?;
    let payload: MeterPayload = envelope::decode_encoded(&response.body)?;

    let meters: Vec<Meter> = payload
        .meter_details
        .unwrap_or_default()
        .into_iter()
        .filter_map(|detail| {
            let number = detail
                .meter_number
                .map(Scalar::into_text)
                .filter(|number| !number.trim().is_empty());
            match number {
                Some(number) => Some(Meter {
                    number,
                    is_ami: detail.is_ami.unwrap_or(false),
                }),
                None => {
                    tracing::warn!("Skipping meter entry without a meter number");
                    None
                }
            }
        })
        .collect();

    let meter = select_meter(meters)?;
    tracing::info!(meter = %meter, is_ami = meter.is_ami, "Resolved meter");
    Ok(meter)
}

/// The first AMI-capable meter, else the first meter listed.
pub fn select_meter(meters: Vec<Meter>) -> Result<Meter> {
    let position = meters.iter().position(|m| m.is_ami).unwrap_or(0);
    meters.into_iter().nth(position).ok_or(AcwdError::NoMeter)
}
