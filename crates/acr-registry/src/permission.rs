//! # Permission Service
//!
//! The role lattice. Holds one [`RoleTable`] and one [`AdminSlot`]; the
//! admin grants and revokes roles, anyone may read them.
//!
//! ## Design
//!
//! - Grants overwrite. An identity that already holds a role simply gets
//!   the new one.
//! - Revoking an identity with no role is a successful no-op.
//! - The role table is untouched by admin hand-over. A former admin keeps
//!   whatever role entry it had.

use acr_core::{Identity, RegistryError, Role};
use parking_lot::Mutex;
use serde::Serialize;

use crate::access::{rejected, AdminSlot, Administered, RoleTable};

const SERVICE: &str = "permission_service";

#[derive(Debug)]
struct PermissionState {
    admin: AdminSlot,
    roles: RoleTable,
}

/// Standalone role registry with a single admin.
#[derive(Debug)]
pub struct PermissionService {
    address: Identity,
    state: Mutex<PermissionState>,
}

/// Complete state of a [`PermissionService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionSnapshot {
    pub address: Identity,
    pub admin: Identity,
    pub roles: RoleTable,
}

impl PermissionService {
    /// Deploy a new instance at `address`, administered by `deployer`.
    pub fn new(address: Identity, deployer: Identity) -> Result<Self, RegistryError> {
        let admin = AdminSlot::new(deployer)?;
        tracing::debug!(service = SERVICE, %address, %deployer, "service deployed");
        Ok(Self {
            address,
            state: Mutex::new(PermissionState {
                admin,
                roles: RoleTable::new(),
            }),
        })
    }

    /// Assign the role named `role_name` to `user`. Admin only.
    pub fn grant_permission(
        &self,
        caller: &Identity,
        user: Identity,
        role_name: &str,
    ) -> Result<Role, RegistryError> {
        let mut state = self.state.lock();
        let PermissionState { admin, roles } = &mut *state;
        let role = roles
            .grant(admin, caller, user, role_name)
            .map_err(rejected(SERVICE, "grant_permission"))?;
        tracing::info!(service = SERVICE, %caller, %user, %role, "role granted");
        Ok(role)
    }

    /// Reset `user` to [`Role::None`]. Admin only.
    pub fn revoke_permission(&self, caller: &Identity, user: Identity) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        let PermissionState { admin, roles } = &mut *state;
        let previous = roles
            .revoke(admin, caller, user)
            .map_err(rejected(SERVICE, "revoke_permission"))?;
        tracing::info!(service = SERVICE, %caller, %user, %previous, "role revoked");
        Ok(())
    }

    /// The role held by `user`.
    pub fn user_role(&self, user: &Identity) -> Role {
        self.state.lock().roles.role_of(user)
    }

    /// Copy of the full service state.
    pub fn snapshot(&self) -> PermissionSnapshot {
        let state = self.state.lock();
        PermissionSnapshot {
            address: self.address,
            admin: state.admin.admin(),
            roles: state.roles.clone(),
        }
    }
}

impl Administered for PermissionService {
    fn service_name(&self) -> &'static str {
        SERVICE
    }

    fn address(&self) -> Identity {
        self.address
    }

    fn admin(&self) -> Identity {
        self.state.lock().admin.admin()
    }

    fn transfer_admin(&self, caller: &Identity, new_admin: Identity) -> Result<(), RegistryError> {
        let previous = self
            .state
            .lock()
            .admin
            .transfer(caller, new_admin)
            .map_err(rejected(SERVICE, "transfer_admin"))?;
        tracing::info!(service = SERVICE, %previous, %new_admin, "admin transferred");
        Ok(())
    }
}
