//! # Service Bindings
//!
//! A binding is the stored address of another service that a dependent
//! service trusts. It is set by the dependent service's own admin after
//! deployment and can be repointed at any time. No check is made that the
//! address hosts a compatible service.

use acr_core::Identity;
use serde::Serialize;

/// A single named dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceBinding {
    dependency: &'static str,
    address: Option<Identity>,
}

impl ServiceBinding {
    /// An unset binding for the named dependency.
    pub const fn unset(dependency: &'static str) -> Self {
        Self {
            dependency,
            address: None,
        }
    }

    /// The bound address, or `None` if never set.
    pub fn address(&self) -> Option<Identity> {
        self.address
    }

    /// Store `address`, returning the address it replaced.
    pub(crate) fn bind(&mut self, address: Identity) -> Option<Identity> {
        self.address.replace(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unbound() {
        let binding = ServiceBinding::unset("diploma_registry");
        assert_eq!(binding.address(), None);
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json["dependency"], "diploma_registry");
        assert!(json["address"].is_null());
    }

    #[test]
    fn rebinding_returns_previous_address() {
        let mut binding = ServiceBinding::unset("diploma_registry");
        assert_eq!(binding.bind(Identity::from_low_u64(1)), None);
        assert_eq!(
            binding.bind(Identity::from_low_u64(2)),
            Some(Identity::from_low_u64(1))
        );
        assert_eq!(binding.address(), Some(Identity::from_low_u64(2)));
    }

    #[test]
    fn zero_address_is_stored_verbatim() {
        let mut binding = ServiceBinding::unset("institution_registry");
        binding.bind(Identity::ZERO);
        assert_eq!(binding.address(), Some(Identity::ZERO));
    }
}
