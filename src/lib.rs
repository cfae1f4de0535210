//! telemetry-dispatch: device telemetry command dispatcher
//!
//! A library that routes named telemetry queries to on-device information
//! providers and answers the public address query with an asynchronous,
//! time-bounded HTTP lookup. Every request receives exactly one response.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod fetch;
pub mod network;
pub mod protocol;
pub mod provider;
pub mod transport;
