//! Decoding of the portal's response envelope.
//!
//! Every JSON endpoint answers `{"d": ...}`. Most put a JSON document inside
//! `d` as a *string*, which has to be decoded a second time; the billing
//! endpoint puts the object there directly. The two shapes are decoded by
//! separate functions so a layout change on one never passes as the other.

use crate::error::DecodeError;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

pub const ENVELOPE_FIELD: &str = "d";

/// Parses the outer body and returns the envelope field's value.
fn envelope_value(body: &str) -> Result<Value, DecodeError> {
    let mut outer: Value = serde_json::from_str(body).map_err(DecodeError::Outer)?;
    match outer.get_mut(ENVELOPE_FIELD).map(Value::take) {
        None | Some(Value::Null) => Err(DecodeError::missing_envelope(ENVELOPE_FIELD)),
        Some(value) => Ok(value),
    }
}

/// Decodes `{"d": "<json document>"}` into `T`.
pub fn decode_encoded<T: DeserializeOwned>(body: &str) -> Result<T, DecodeError> {
    let encoded = match envelope_value(body)? {
        Value::String(encoded) => encoded,
        other => {
            return Err(DecodeError::Shape(serde_json::Error::custom(format!(
                "expected `{}` to hold an encoded JSON string, found {}",
                ENVELOPE_FIELD,
                kind_of(&other)
            ))))
        }
    };
    let inner: Value = serde_json::from_str(&encoded)
        .map_err(|source| DecodeError::inner(ENVELOPE_FIELD, source))?;
    serde_json::from_value(inner).map_err(DecodeError::Shape)
}

/// Decodes `{"d": {...}}` into `T` without a second decode.
pub fn decode_direct<T: DeserializeOwned>(body: &str) -> Result<T, DecodeError> {
    serde_json::from_value(envelope_value(body)?).map_err(DecodeError::Shape)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
