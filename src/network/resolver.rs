//! First-private-address resolution.

use std::net::IpAddr;

use crate::provider::{InfoProvider, ProviderError, Value};

use super::{InterfaceEnumerator, InterfaceSnapshot};

/// Returns true if `addr` is a site-local (private, non-routable) address.
///
/// - IPv4: `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`
/// - IPv6: the deprecated site-local block `fec0::/10`
///
/// Link-local and loopback addresses are not site-local.
#[must_use]
pub const fn is_site_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfec0,
    }
}

/// Resolves the device's private address by scanning network interfaces.
///
/// Walks interfaces in enumeration order and, within each, addresses in
/// the order they are bound; returns the first address that is neither
/// loopback nor outside the site-local ranges. Enumeration order is
/// whatever the [`InterfaceEnumerator`] reports.
#[derive(Debug, Clone, Default)]
pub struct PrivateAddressResolver<E> {
    enumerator: E,
}

impl<E: InterfaceEnumerator> PrivateAddressResolver<E> {
    /// Creates a resolver over the given enumerator.
    #[must_use]
    pub const fn new(enumerator: E) -> Self {
        Self { enumerator }
    }

    /// Finds the first private address.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Enumerate`] if interfaces cannot be listed.
    pub fn resolve(&self) -> Result<Option<IpAddr>, ProviderError> {
        let interfaces = self.enumerator.interfaces()?;
        Ok(first_private(&interfaces))
    }
}

fn first_private(interfaces: &[InterfaceSnapshot]) -> Option<IpAddr> {
    interfaces
        .iter()
        .flat_map(|iface| {
            iface
                .addresses
                .iter()
                .map(move |addr| (iface.name.as_str(), addr))
        })
        .find(|(_, addr)| !addr.is_loopback() && is_site_local(addr))
        .map(|(name, addr)| {
            tracing::debug!(interface = name, address = %addr, "Resolved private address");
            *addr
        })
}

impl<E: InterfaceEnumerator> InfoProvider for PrivateAddressResolver<E> {
    fn fetch(&self) -> Result<Value, ProviderError> {
        Ok(self.resolve()?.map(|addr| addr.to_string()).into())
    }
}
