//! Application error types.
//!
//! Every failure the settings pipeline can surface is an [`AppError`] carrying
//! one of a closed set of [`ErrorKind`]s. Errors are plain values: they are
//! stored in settings state as field errors and persisted with it, so they
//! serialize to a structured JSON object keyed by the kind's stable code.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message shown for every kind that does not expose its own text.
pub const GENERIC_USER_MESSAGE: &str = "Something went wrong.";

pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error.";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error.";

/// Closed set of domain error kinds.
///
/// Serialized as the numeric code (see [`ErrorKind::code`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ErrorKind {
    /// HTTP 400.
    BadRequestError,
    /// HTTP 404.
    NotFoundError,
    /// HTTP 2xx with a payload of the wrong shape.
    InvalidResponseError,
    /// Transport-level failure, no response received.
    NetworkError,
    /// Local input validation failure.
    TypeError,
    /// HTTP 2xx with a body that is not valid JSON.
    SyntaxError,
    /// Payload is well-formed but holds too little data to be useful.
    InvalidDataLength,
    /// Any other non-2xx status.
    UnexpectedError,
    /// Failure that could not be classified at all.
    UnknownError,
}

impl ErrorKind {
    /// Every kind, in code order.
    pub const ALL: [ErrorKind; 9] = [
        Self::BadRequestError,
        Self::NotFoundError,
        Self::InvalidResponseError,
        Self::NetworkError,
        Self::TypeError,
        Self::SyntaxError,
        Self::InvalidDataLength,
        Self::UnexpectedError,
        Self::UnknownError,
    ];

    /// Stable numeric code used for persistence and identity.
    pub const fn code(self) -> u16 {
        match self {
            Self::BadRequestError => 400,
            Self::NotFoundError => 404,
            Self::InvalidResponseError => 1000,
            Self::NetworkError => 1001,
            Self::TypeError => 4000,
            Self::SyntaxError => 4001,
            Self::InvalidDataLength => 4002,
            Self::UnexpectedError => 5000,
            Self::UnknownError => 5001,
        }
    }

    /// Look up a kind by its code.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Whether messages of this kind are safe to show to the operator verbatim.
    pub const fn is_user_facing(self) -> bool {
        matches!(
            self,
            Self::NotFoundError | Self::TypeError | Self::InvalidDataLength
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadRequestError => "BadRequestError",
            Self::NotFoundError => "NotFoundError",
            Self::InvalidResponseError => "InvalidResponseError",
            Self::NetworkError => "NetworkError",
            Self::TypeError => "TypeError",
            Self::SyntaxError => "SyntaxError",
            Self::InvalidDataLength => "InvalidDataLength",
            Self::UnexpectedError => "UnexpectedError",
            Self::UnknownError => "UnknownError",
        };
        f.write_str(name)
    }
}

impl From<ErrorKind> for u16 {
    fn from(kind: ErrorKind) -> Self {
        kind.code()
    }
}

/// Returned when deserializing a code outside the taxonomy.
#[derive(Debug, Error)]
#[error("unknown error code {0}")]
pub struct UnknownErrorCode(pub u16);

impl TryFrom<u16> for ErrorKind {
    type Error = UnknownErrorCode;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(UnknownErrorCode(code))
    }
}

/// A classified application error.
///
/// Immutable once built; `cause` keeps the rendered underlying error, if any.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct AppError {
    #[serde(rename = "code")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl AppError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying error.
    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequestError, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFoundError, message)
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidResponseError, message)
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    /// Create a local validation error.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Create a syntax (unparseable body) error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    /// Create an invalid data length error.
    pub fn invalid_data_length(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDataLength, message)
    }

    /// Create an unexpected status error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedError, message)
    }

    /// Create an unknown error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownError, message)
    }

    /// Stable numeric code of this error's kind.
    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    /// Text to show the operator.
    ///
    /// Only not-found, validation and data-length errors expose their own
    /// message; everything else collapses to [`GENERIC_USER_MESSAGE`].
    pub fn user_message(&self) -> &str {
        if self.kind.is_user_facing() {
            &self.message
        } else {
            GENERIC_USER_MESSAGE
        }
    }
}

// Conversions from common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            // Request was never sent.
            Self::unknown(UNKNOWN_ERROR_MESSAGE).with_cause(err)
        } else if err.is_decode() {
            Self::syntax(INVALID_JSON_MESSAGE).with_cause(err)
        } else {
            Self::network(CONNECTION_ERROR_MESSAGE).with_cause(err)
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::syntax(INVALID_JSON_MESSAGE).with_cause(err)
    }
}
