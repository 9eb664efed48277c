//! Error types for the delivery service, the session and configuration.

use thiserror::Error;

use crate::model::OrderId;
use crate::session::SessionState;

/// Failure talking to the delivery service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("delivery service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("operation not allowed while {state:?}")]
    Busy { state: SessionState },

    #[error("order {0} is not in the candidate pool")]
    UnknownCandidate(OrderId),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq)]
#[error("date range ends ({end}) before it starts ({start})")]
pub struct DateRangeError {
    pub start: jiff::civil::Date,
    pub end: jiff::civil::Date,
}
