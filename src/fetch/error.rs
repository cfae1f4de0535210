//! Error types for the public address lookup.

use std::time::Duration;

use thiserror::Error;

use crate::transport::HttpError;

/// Why a lookup produced no address.
///
/// Only visible to logging and to callers of
/// [`super::PublicAddressFetch::lookup`]; the completion callback always
/// receives `Success(Null)` for every variant.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The endpoint answered with something other than `200 OK`.
    #[error("Endpoint answered with status {0}")]
    Status(http::StatusCode),

    /// The HTTP client failed (connect, DNS, TLS, read).
    #[error(transparent)]
    Http(#[from] HttpError),

    /// No complete response arrived within the overall bound.
    #[error("No response within {0:?}")]
    TimedOut(Duration),
}
