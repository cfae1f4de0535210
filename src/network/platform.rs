//! Host interface enumeration backed by `sysinfo`.
//!
//! `sysinfo` reports interfaces from an unordered map. Interfaces are sorted
//! by name so repeated calls on an unchanged host agree with each other;
//! the resulting order is still not the kernel's own index order.

use sysinfo::Networks;

use super::{EnumerateError, InterfaceEnumerator, InterfaceSnapshot};

/// [`InterfaceEnumerator`] over the host's live network interfaces.
///
/// # Example
///
/// ```no_run
/// use telemetry_dispatch::network::InterfaceEnumerator;
/// use telemetry_dispatch::network::platform::SysinfoEnumerator;
///
/// let interfaces = SysinfoEnumerator::new().interfaces().unwrap();
/// for iface in interfaces {
///     println!("{}: {:?}", iface.name, iface.addresses);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SysinfoEnumerator {
    _private: (),
}

impl SysinfoEnumerator {
    /// Creates a new host enumerator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl InterfaceEnumerator for SysinfoEnumerator {
    fn interfaces(&self) -> Result<Vec<InterfaceSnapshot>, EnumerateError> {
        let networks = Networks::new_with_refreshed_list();

        let mut interfaces: Vec<InterfaceSnapshot> = networks
            .list()
            .iter()
            .map(|(name, data)| {
                InterfaceSnapshot::new(
                    name.clone(),
                    data.ip_networks().iter().map(|net| net.addr).collect(),
                )
            })
            .collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::trace!(count = interfaces.len(), "Enumerated network interfaces");
        Ok(interfaces)
    }
}
