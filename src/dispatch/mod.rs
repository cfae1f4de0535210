//! Command dispatch.
//!
//! This module provides:
//! - The dispatcher routing commands to providers or the async lookup ([`Dispatcher`])
//! - Its builder, which fixes the command-to-provider table at startup ([`DispatcherBuilder`])
//! - The uniform response contract ([`Response`])
//! - Failure reasons ([`DispatchError`]) and assembly errors ([`BuildError`])

mod dispatcher;
mod error;
mod response;

#[cfg(test)]
mod dispatcher_tests;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::{BuildError, DispatchError};
pub use response::Response;
