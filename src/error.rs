//! Error types for the ACWD water usage forwarder.
//!
//! Errors are split by how far they reach: `AcquisitionError` is the only
//! failure a run returns, while `FetchError` and `MalformedRecordError` are
//! recorded inside a successful result and never abort it.

use chrono::NaiveDate;
use serde_derive::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using our custom error types.
pub type Result<T, E = AcwdError> = std::result::Result<T, E>;

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable parsing failed
    #[error("failed to parse environment variables: {0}")]
    EnvParse(String),

    /// Configuration value is invalid
    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Failures unwrapping the portal's `{"d": "<json>"}` envelope.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The HTTP body itself is not JSON.
    #[error("response body is not valid JSON: {0}")]
    Outer(#[source] serde_json::Error),

    /// The body is JSON but carries no usable envelope field.
    #[error("response has no `{field}` envelope field")]
    MissingEnvelope { field: String },

    /// The envelope string does not hold a JSON document.
    #[error("envelope field `{field}` does not contain a JSON document: {source}")]
    Inner {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// The decoded payload does not have the expected shape.
    #[error("payload has unexpected shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Portal communication and protocol errors.
#[derive(Error, Debug)]
pub enum AcwdError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Network timeout
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Server returned an error status
    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// The landing page or a response no longer has the expected layout
    #[error("unexpected portal layout: {0}")]
    ProtocolShape(String),

    /// JSON decoding failed at either envelope layer
    #[error("failed to decode response: {0}")]
    Decode(#[from] DecodeError),

    /// Login was rejected or returned no matching identity
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The account has no meter to read from
    #[error("no usable meter registered on account")]
    NoMeter,

    /// Billing summary could not be retrieved
    #[error("billing unavailable: {0}")]
    BillingUnavailable(String),
}

/// One day's usage request failed; the run carries on without it.
#[derive(Error, Debug)]
#[error("failed to fetch usage for {date}")]
pub struct FetchError {
    pub date: NaiveDate,
    #[source]
    pub source: AcwdError,
}

/// One hourly row could not be turned into a usage record.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("malformed usage row '{usage_date} {hourly}': {message}")]
pub struct MalformedRecordError {
    pub usage_date: String,
    pub hourly: String,
    pub message: String,
}

/// Stages of an acquisition run whose failure is fatal.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Stage {
    Token,
    Login,
    Meter,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stage::Token => write!(f, "token"),
            Stage::Login => write!(f, "login"),
            Stage::Meter => write!(f, "meter"),
        }
    }
}

/// A run could not produce any usage data.
#[derive(Error, Debug)]
#[error("acquisition failed at {stage} stage: {source}")]
pub struct AcquisitionError {
    pub stage: Stage,
    #[source]
    pub source: AcwdError,
}

impl ConfigError {
    /// Creates a new environment parse error.
    pub fn env_parse(err: impl fmt::Display) -> Self {
        Self::EnvParse(err.to_string())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl DecodeError {
    pub fn missing_envelope(field: impl Into<String>) -> Self {
        Self::MissingEnvelope {
            field: field.into(),
        }
    }

    pub fn inner(field: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Inner {
            field: field.into(),
            source,
        }
    }
}

impl AcwdError {
    /// Creates a server error from HTTP status and response body.
    pub fn server_error(status: reqwest::StatusCode, body: String) -> Self {
        Self::ServerError {
            status: status.as_u16(),
            message: body,
        }
    }

    /// Maps a transport error, folding timeouts into `Timeout`.
    pub fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else {
            Self::Http(err)
        }
    }

    pub fn protocol_shape(message: impl Into<String>) -> Self {
        Self::ProtocolShape(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }
}

impl MalformedRecordError {
    pub fn new(
        usage_date: impl Into<String>,
        hourly: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self {
            usage_date: usage_date.into(),
            hourly: hourly.into(),
            message: message.to_string(),
        }
    }
}

impl AcquisitionError {
    pub fn new(stage: Stage, source: AcwdError) -> Self {
        Self { stage, source }
    }

    /// True when the portal changed its page or response layout.
    pub fn is_contract_change(&self) -> bool {
        matches!(
            self.source,
            AcwdError::ProtocolShape(_) | AcwdError::Decode(_)
        )
    }

    /// True when the portal rejected the configured credentials.
    pub fn is_rejected_credentials(&self) -> bool {
        matches!(self.source, AcwdError::Authentication(_))
    }
}
