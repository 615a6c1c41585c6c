// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the Orchestrate client.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Variants fall into four classes:
//!
//! - **transport**: the HTTP round trip itself failed ([`Error::Transport`]);
//! - **protocol**: the service answered but omitted metadata the client relies
//!   on ([`Error::MissingRef`], [`Error::MalformedCursor`],
//!   [`Error::NoMorePages`]);
//! - **service**: the service rejected the call ([`Error::Service`]);
//! - **decode**: a successful body did not match the requested type
//!   ([`Error::Decode`]).
//!
//! Nothing is retried inside the crate. Each operation yields either its
//! result or exactly one of these values.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Status codes the service uses for a failed precondition.
const CONFLICT_CODES: [u16; 2] = [409, 412];

/// Error returned by every client operation.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection, DNS or timeout failure. The server-side effect of a write
    /// that fails this way is unknown.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service returned a non-success status.
    #[error("{0}")]
    Service(ServiceError),

    /// A successful write (or read) carried a location header without a
    /// usable ref segment.
    #[error("missing ref component in {header} header: {value:?}")]
    MissingRef {
        /// Header that was inspected (`Location` or `Content-Location`).
        header: &'static str,
        /// Raw header value as received.
        value: String,
    },

    /// A continuation cursor did not start with the API root path.
    #[error("malformed page cursor: {0:?}")]
    MalformedCursor(String),

    /// A next/previous page was requested from a page that has none.
    #[error("no more pages")]
    NoMorePages,

    /// The response body did not deserialize into the requested type.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be encoded as JSON.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The API root joined with a trailing path is not a valid URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A trailing path has a `.` or `..` segment, which URL normalisation
    /// would fold into a different resource.
    #[error("path would be rewritten by URL normalisation: {0:?}")]
    DotSegment(String),

    /// A header value could not be represented on the wire.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

impl Error {
    /// HTTP status code when this is a service error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Service(e) => Some(e.status_code),
            _ => None,
        }
    }

    /// True when the service refused a conditional write because its
    /// precondition did not hold.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Service(e) if e.is_conflict())
    }

    /// True when the service reports the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// True for connection-level failures where a write may or may not have
    /// been applied.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        Error::Service(err)
    }
}

/// Crate-level result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A non-success response from the service.
///
/// Built once from the response status line and a best-effort decode of the
/// JSON body `{"message": .., "code": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceError {
    /// Status line, e.g. `"412 Precondition Failed"`.
    #[serde(skip)]
    pub status: String,
    /// Numeric HTTP status.
    #[serde(skip)]
    pub status_code: u16,
    /// Service-specific message.
    #[serde(default)]
    pub message: String,
    /// Service-specific machine readable code, e.g. `item_version_mismatch`.
    #[serde(default)]
    pub code: String,
}

impl ServiceError {
    /// Build from a status and the raw response body.
    ///
    /// A body that is not the expected JSON still produces an error; its
    /// message then quotes the raw body.
    pub fn from_body(status: reqwest::StatusCode, body: &[u8]) -> Self {
        let status_line = match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => status.as_u16().to_string(),
        };

        let mut err = match serde_json::from_slice::<ServiceError>(body) {
            Ok(decoded) => decoded,
            Err(e) => ServiceError {
                message: format!(
                    "can not unmarshal JSON response '''{}''': {e}",
                    String::from_utf8_lossy(body)
                ),
                ..Default::default()
            },
        };
        err.status = status_line;
        err.status_code = status.as_u16();
        err
    }

    /// Build when the body itself could not be read.
    pub fn unreadable(status: reqwest::StatusCode, cause: &reqwest::Error) -> Self {
        let mut err = Self::from_body(status, b"");
        err.message = format!("can not read HTTP response: {cause}");
        err
    }

    /// 409 Conflict or 412 Precondition Failed.
    pub fn is_conflict(&self) -> bool {
        CONFLICT_CODES.contains(&self.status_code)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.status_code, self.message)
    }
}

impl std::error::Error for ServiceError {}
