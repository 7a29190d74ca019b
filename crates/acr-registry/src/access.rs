//! # Access Control
//!
//! The authorization building blocks every service embeds:
//!
//! - [`AdminSlot`]: the single admin identity of one service instance.
//! - [`RoleTable`]: an identity → [`Role`] mapping, last write wins.
//! - [`Administered`]: the admin surface each service implements on its
//!   own, so that hand-over can be driven uniformly.
//!
//! There is no global authority. Each service instance owns its own slot
//! and its own table, and a change in one is invisible to the others.

use std::collections::BTreeMap;

use acr_core::{Identity, RegistryError, Role};
use serde::Serialize;

/// The admin identity of a single service instance.
///
/// Set to the deployer at construction and replaced only through
/// [`AdminSlot::transfer`]. Never holds the zero identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AdminSlot {
    admin: Identity,
}

impl AdminSlot {
    /// Create a slot held by `deployer`.
    pub fn new(deployer: Identity) -> Result<Self, RegistryError> {
        if deployer.is_zero() {
            return Err(RegistryError::InvalidAddress {
                parameter: "Deployer",
            });
        }
        Ok(Self { admin: deployer })
    }

    /// The current admin.
    pub fn admin(&self) -> Identity {
        self.admin
    }

    /// Whether `caller` is the current admin.
    pub fn is_admin(&self, caller: &Identity) -> bool {
        self.admin == *caller
    }

    /// Reject `caller` unless it is the current admin.
    pub fn ensure_admin(&self, caller: &Identity) -> Result<(), RegistryError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(RegistryError::not_admin(*caller))
        }
    }

    /// Hand the slot to `new_admin`, returning the previous admin.
    ///
    /// The zero identity is rejected before the caller is checked, so a
    /// zero target fails with `InvalidAddress` whoever calls.
    pub fn transfer(
        &mut self,
        caller: &Identity,
        new_admin: Identity,
    ) -> Result<Identity, RegistryError> {
        if new_admin.is_zero() {
            return Err(RegistryError::InvalidAddress {
                parameter: "New admin",
            });
        }
        self.ensure_admin(caller)?;
        Ok(std::mem::replace(&mut self.admin, new_admin))
    }
}

/// Identity → role mapping for one service.
///
/// Only non-`None` roles are stored; every other identity reads as
/// [`Role::None`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleTable {
    roles: BTreeMap<Identity, Role>,
}

impl RoleTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The role held by `identity`. Never fails.
    pub fn role_of(&self, identity: &Identity) -> Role {
        self.roles.get(identity).copied().unwrap_or_default()
    }

    /// Whether `identity` currently holds exactly `role`.
    pub fn has_role(&self, identity: &Identity, role: Role) -> bool {
        self.role_of(identity) == role
    }

    /// Write a role directly, bypassing authorization. Used for seeding at
    /// construction.
    pub(crate) fn set(&mut self, identity: Identity, role: Role) {
        if role.is_none() {
            self.roles.remove(&identity);
        } else {
            self.roles.insert(identity, role);
        }
    }

    /// Admin-gated grant.
    ///
    /// Checks, in order: `user` is non-zero, `caller` is the admin of
    /// `slot`, `role_name` parses to a grantable role. Overwrites any role
    /// `user` already holds.
    pub fn grant(
        &mut self,
        slot: &AdminSlot,
        caller: &Identity,
        user: Identity,
        role_name: &str,
    ) -> Result<Role, RegistryError> {
        if user.is_zero() {
            return Err(RegistryError::InvalidAddress { parameter: "User" });
        }
        slot.ensure_admin(caller)?;
        let role = Role::parse_grantable(role_name)?;
        self.set(user, role);
        Ok(role)
    }

    /// Admin-gated revoke. Returns the role that was removed.
    ///
    /// Revoking an identity with no role succeeds and returns `Role::None`.
    pub fn revoke(
        &mut self,
        slot: &AdminSlot,
        caller: &Identity,
        user: Identity,
    ) -> Result<Role, RegistryError> {
        if user.is_zero() {
            return Err(RegistryError::InvalidAddress { parameter: "User" });
        }
        slot.ensure_admin(caller)?;
        Ok(self.roles.remove(&user).unwrap_or_default())
    }

    /// Number of identities holding a role.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether no identity holds a role.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// The admin surface shared by every service.
///
/// Each service implements this against its own [`AdminSlot`]; there is no
/// blanket implementation.
pub trait Administered: Send + Sync {
    /// Short, stable service name used in logs.
    fn service_name(&self) -> &'static str;

    /// The address this service was deployed at.
    fn address(&self) -> Identity;

    /// The current admin of this service.
    fn admin(&self) -> Identity;

    /// Replace this service's admin. See [`AdminSlot::transfer`].
    fn transfer_admin(&self, caller: &Identity, new_admin: Identity) -> Result<(), RegistryError>;
}

/// Log a rejected call and pass the error through.
pub(crate) fn rejected(
    service: &'static str,
    operation: &'static str,
) -> impl FnOnce(RegistryError) -> RegistryError {
    move |err| {
        tracing::warn!(service, operation, code = err.code(), error = %err, "call rejected");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> Identity {
        Identity::from_low_u64(n)
    }

    #[test]
    fn slot_starts_with_deployer() {
        let slot = AdminSlot::new(id(1)).unwrap();
        assert_eq!(slot.admin(), id(1));
        assert!(slot.is_admin(&id(1)));
        assert!(!slot.is_admin(&id(2)));
    }

    #[test]
    fn slot_rejects_zero_deployer() {
        assert!(matches!(
            AdminSlot::new(Identity::ZERO),
            Err(RegistryError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn transfer_returns_previous_admin() {
        let mut slot = AdminSlot::new(id(1)).unwrap();
        let previous = slot.transfer(&id(1), id(2)).unwrap();
        assert_eq!(previous, id(1));
        assert_eq!(slot.admin(), id(2));
    }

    #[test]
    fn transfer_to_zero_fails_for_any_caller() {
        let mut slot = AdminSlot::new(id(1)).unwrap();
        for caller in [id(1), id(3)] {
            let err = slot.transfer(&caller, Identity::ZERO).unwrap_err();
            assert_eq!(
                err,
                RegistryError::InvalidAddress {
                    parameter: "New admin"
                }
            );
        }
        assert_eq!(slot.admin(), id(1));
    }

    #[test]
    fn transfer_by_non_admin_leaves_slot_unchanged() {
        let mut slot = AdminSlot::new(id(1)).unwrap();
        let err = slot.transfer(&id(3), id(3)).unwrap_err();
        assert_eq!(err, RegistryError::not_admin(id(3)));
        assert_eq!(slot.admin(), id(1));
    }

    #[test]
    fn grant_overwrites_previous_role() {
        let slot = AdminSlot::new(id(1)).unwrap();
        let mut table = RoleTable::new();
        table.grant(&slot, &id(1), id(5), "STUDENT").unwrap();
        table.grant(&slot, &id(1), id(5), "EMPLOYER").unwrap();
        assert_eq!(table.role_of(&id(5)), Role::Employer);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn grant_check_order_is_address_then_admin_then_role() {
        let slot = AdminSlot::new(id(1)).unwrap();
        let mut table = RoleTable::new();

        let zero = table.grant(&slot, &id(9), Identity::ZERO, "BOGUS").unwrap_err();
        assert_eq!(zero.code(), "INVALID_ADDRESS");

        let unauthorized = table.grant(&slot, &id(9), id(5), "BOGUS").unwrap_err();
        assert_eq!(unauthorized.code(), "UNAUTHORIZED");

        let bad_role = table.grant(&slot, &id(1), id(5), "BOGUS").unwrap_err();
        assert_eq!(bad_role, RegistryError::InvalidRole("BOGUS".into()));

        assert!(table.is_empty());
    }

    #[test]
    fn revoke_unknown_identity_is_noop_success() {
        let slot = AdminSlot::new(id(1)).unwrap();
        let mut table = RoleTable::new();
        assert_eq!(table.revoke(&slot, &id(1), id(7)).unwrap(), Role::None);
        assert_eq!(table.revoke(&slot, &id(1), id(7)).unwrap(), Role::None);
        assert_eq!(table.role_of(&id(7)), Role::None);
    }

    #[test]
    fn revoke_returns_removed_role() {
        let slot = AdminSlot::new(id(1)).unwrap();
        let mut table = RoleTable::new();
        table.grant(&slot, &id(1), id(5), "INSTITUTION").unwrap();
        assert_eq!(table.revoke(&slot, &id(1), id(5)).unwrap(), Role::Institution);
        assert!(table.has_role(&id(5), Role::None));
    }

    #[test]
    fn set_none_removes_entry() {
        let mut table = RoleTable::new();
        table.set(id(5), Role::Admin);
        table.set(id(5), Role::None);
        assert!(table.is_empty());
    }
}
