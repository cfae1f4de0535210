//! Asynchronous public address lookup.
//!
//! This module provides:
//! - The background lookup task ([`PublicAddressFetch`])
//! - Per-request in-flight state with a single-write outcome slot ([`PendingFetch`])
//! - Cancellation ([`FetchHandle`])
//! - Internally distinguishable failures ([`FetchFailure`])
//!
//! # Outcome Semantics
//!
//! | Endpoint behaviour | Delivered response |
//! |--------------------|--------------------|
//! | `200 OK` | `Success(Text(body))` |
//! | any other status | `Success(Null)` |
//! | timeout, DNS, connect or I/O failure | `Success(Null)` |
//! | task aborted or dropped | `Success(Null)` |
//!
//! Failures are never surfaced as error responses; they are logged with
//! their [`FetchFailure`] and reported as "no address".

mod error;
mod pending;
mod task;


pub use error::FetchFailure;
pub use pending::{Completion, PendingFetch};
pub use task::{FetchHandle, FetchTimeouts, PublicAddressFetch};
