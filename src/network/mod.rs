//! Network interface enumeration and private address resolution.
//!
//! This module provides types and traits for:
//! - Representing interface snapshots ([`InterfaceSnapshot`])
//! - Enumerating interfaces ([`InterfaceEnumerator`])
//! - Resolving the first private address ([`PrivateAddressResolver`])
//! - The host implementation ([`platform`])

mod interface;
pub mod platform;
mod resolver;


pub use interface::{EnumerateError, InterfaceEnumerator, InterfaceSnapshot};
pub use resolver::{PrivateAddressResolver, is_site_local};
