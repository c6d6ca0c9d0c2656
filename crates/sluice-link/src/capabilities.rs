use sluice_core::error::Result;
use sluice_protocol::{Fields, Symbol};

use crate::settlement::ensure_unsealed;

/// Offered/desired capabilities and link properties, local and remote.
///
/// `None` means "none declared", which is distinct from an empty list.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    offered: Option<Vec<Symbol>>,
    desired: Option<Vec<Symbol>>,
    properties: Option<Fields>,
    remote_offered: Option<Vec<Symbol>>,
    remote_desired: Option<Vec<Symbol>>,
    remote_properties: Option<Fields>,
    sealed: bool,
}

impl Capabilities {
    /// Creates an empty negotiation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capabilities we offer.
    pub fn offered(&self) -> Option<&[Symbol]> {
        self.offered.as_deref()
    }

    /// Capabilities we ask the peer for.
    pub fn desired(&self) -> Option<&[Symbol]> {
        self.desired.as_deref()
    }

    /// Our link properties.
    pub fn properties(&self) -> Option<&Fields> {
        self.properties.as_ref()
    }

    /// Sets the offered capabilities. Fails once the link is open.
    pub fn set_offered(&mut self, capabilities: Option<Vec<Symbol>>) -> Result<()> {
        ensure_unsealed(self.sealed, "offered capabilities")?;
        self.offered = capabilities;
        Ok(())
    }

    /// Sets the desired capabilities. Fails once the link is open.
    pub fn set_desired(&mut self, capabilities: Option<Vec<Symbol>>) -> Result<()> {
        ensure_unsealed(self.sealed, "desired capabilities")?;
        self.desired = capabilities;
        Ok(())
    }

    /// Sets the link properties. Fails once the link is open.
    pub fn set_properties(&mut self, properties: Option<Fields>) -> Result<()> {
        ensure_unsealed(self.sealed, "properties")?;
        self.properties = properties;
        Ok(())
    }

    /// Capabilities the peer offers.
    pub fn remote_offered(&self) -> Option<&[Symbol]> {
        self.remote_offered.as_deref()
    }

    /// Capabilities the peer asks for.
    pub fn remote_desired(&self) -> Option<&[Symbol]> {
        self.remote_desired.as_deref()
    }

    /// The peer's link properties.
    pub fn remote_properties(&self) -> Option<&Fields> {
        self.remote_properties.as_ref()
    }

    /// True if the peer offers `capability`.
    pub fn peer_offers(&self, capability: &Symbol) -> bool {
        self.remote_offered.as_ref().is_some_and(|offered| offered.contains(capability))
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub(crate) fn record_remote(
        &mut self,
        offered: Option<Vec<Symbol>>,
        desired: Option<Vec<Symbol>>,
        properties: Option<Fields>,
    ) {
        self.remote_offered = offered;
        self.remote_desired = desired;
        self.remote_properties = properties;
    }
}

#[cfg(test)]
mod tests {
    use sluice_core::error::ErrorKind;
    use sluice_protocol::Value;

    use super::*;

    #[test]
    fn test_none_differs_from_empty() {
        let mut caps = Capabilities::new();
        assert_eq!(caps.offered(), None);

        caps.set_offered(Some(Vec::new())).unwrap();
        assert_eq!(caps.offered(), Some(&[][..]));
    }

    #[test]
    fn test_properties_frozen_after_seal() {
        let mut caps = Capabilities::new();
        let mut props = Fields::new();
        props.insert(Symbol::from("priority"), Value::from(3u64));
        caps.set_properties(Some(props.clone())).unwrap();
        caps.seal();

        assert_eq!(
            caps.set_desired(Some(vec![Symbol::from("shared")])),
            Err(ErrorKind::ContractViolation { field: "desired capabilities" })
        );
        assert_eq!(caps.properties(), Some(&props));
    }

    #[test]
    fn test_peer_offers() {
        let mut caps = Capabilities::new();
        assert!(!caps.peer_offers(&Symbol::from("shared")));

        caps.record_remote(Some(vec![Symbol::from("shared")]), None, None);
        assert!(caps.peer_offers(&Symbol::from("shared")));
        assert_eq!(caps.remote_desired(), None);
    }
}
