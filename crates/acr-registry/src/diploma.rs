//! # Diploma Registry
//!
//! Issues diplomas on behalf of institutions. Issuance is gated by the
//! `INSTITUTION` role in this service's own role table, which the admin
//! manages with the same grant/revoke contract as the permission service.
//!
//! ## Design
//!
//! - The deployer is seeded with `ADMIN` in the local role table as well as
//!   holding the [`AdminSlot`]. The two are independent: the slot gates
//!   administration, the table gates issuance.
//! - Issuance does not consult the bound institution registry. The binding
//!   is stored for callers that want to follow it.
//! - Diploma ids come from a per-store counter starting at 1. Ids are never
//!   reused; failed calls do not advance the counter.

use std::collections::BTreeMap;

use acr_core::{Diploma, DiplomaId, Identity, RegistryError, Role};
use parking_lot::Mutex;
use serde::Serialize;

use crate::access::{rejected, AdminSlot, Administered, RoleTable};
use crate::binding::ServiceBinding;

const SERVICE: &str = "diploma_registry";

// ─── Diploma Book ───────────────────────────────────────────────────

/// An append-only diploma table with its own id counter.
///
/// Embedded by every service that stores diplomas. Two books never share
/// ids or records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiplomaBook {
    next_id: DiplomaId,
    diplomas: BTreeMap<DiplomaId, Diploma>,
}

impl Default for DiplomaBook {
    fn default() -> Self {
        Self {
            next_id: DiplomaId::FIRST,
            diplomas: BTreeMap::new(),
        }
    }
}

impl DiplomaBook {
    /// Store a new diploma under the next id and return it.
    pub(crate) fn issue(
        &mut self,
        student: Identity,
        institution: &str,
        program: &str,
        issue_date: u64,
    ) -> DiplomaId {
        let id = self.next_id;
        self.diplomas.insert(
            id,
            Diploma {
                id,
                student,
                institution: institution.to_string(),
                program: program.to_string(),
                issue_date,
            },
        );
        self.next_id = id.next();
        id
    }

    /// The diploma stored under `id`.
    pub fn get(&self, id: DiplomaId) -> Option<&Diploma> {
        self.diplomas.get(&id)
    }

    /// The id the next issued diploma will receive.
    pub fn next_id(&self) -> DiplomaId {
        self.next_id
    }

    /// Number of diplomas issued.
    pub fn len(&self) -> usize {
        self.diplomas.len()
    }

    /// Whether nothing has been issued yet.
    pub fn is_empty(&self) -> bool {
        self.diplomas.is_empty()
    }
}

// ─── Registry ───────────────────────────────────────────────────────

#[derive(Debug)]
struct DiplomaState {
    admin: AdminSlot,
    roles: RoleTable,
    book: DiplomaBook,
    institution_registry: ServiceBinding,
}

/// Role-gated diploma issuance.
#[derive(Debug)]
pub struct DiplomaRegistry {
    address: Identity,
    state: Mutex<DiplomaState>,
}

/// Complete state of a [`DiplomaRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiplomaRegistrySnapshot {
    pub address: Identity,
    pub admin: Identity,
    pub roles: RoleTable,
    pub book: DiplomaBook,
    pub institution_registry: ServiceBinding,
}

impl DiplomaRegistry {
    /// Deploy a new instance at `address`. `deployer` becomes admin and is
    /// seeded with the `ADMIN` role.
    pub fn new(address: Identity, deployer: Identity) -> Result<Self, RegistryError> {
        let admin = AdminSlot::new(deployer)?;
        let mut roles = RoleTable::new();
        roles.set(deployer, Role::Admin);
        tracing::debug!(service = SERVICE, %address, %deployer, "service deployed");
        Ok(Self {
            address,
            state: Mutex::new(DiplomaState {
                admin,
                roles,
                book: DiplomaBook::default(),
                institution_registry: ServiceBinding::unset("institution_registry"),
            }),
        })
    }

    /// Assign the role named `role_name` to `user` in this registry's role
    /// table. Admin only.
    pub fn grant_permission(
        &self,
        caller: &Identity,
        user: Identity,
        role_name: &str,
    ) -> Result<Role, RegistryError> {
        let mut state = self.state.lock();
        let DiplomaState { admin, roles, .. } = &mut *state;
        let role = roles
            .grant(admin, caller, user, role_name)
            .map_err(rejected(SERVICE, "grant_permission"))?;
        tracing::info!(service = SERVICE, %caller, %user, %role, "role granted");
        Ok(role)
    }

    /// Reset `user` to [`Role::None`] in this registry's role table. Admin
    /// only.
    pub fn revoke_permission(&self, caller: &Identity, user: Identity) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        let DiplomaState { admin, roles, .. } = &mut *state;
        let previous = roles
            .revoke(admin, caller, user)
            .map_err(rejected(SERVICE, "revoke_permission"))?;
        tracing::info!(service = SERVICE, %caller, %user, %previous, "role revoked");
        Ok(())
    }

    /// The role `user` holds in this registry.
    pub fn user_role(&self, user: &Identity) -> Role {
        self.state.lock().roles.role_of(user)
    }

    /// Issue a diploma to `student`. Caller must hold `INSTITUTION`.
    pub fn create_diploma(
        &self,
        caller: &Identity,
        student: Identity,
        institution: &str,
        program: &str,
        issue_date: u64,
    ) -> Result<DiplomaId, RegistryError> {
        let mut state = self.state.lock();
        if !state.roles.has_role(caller, Role::Institution) {
            return Err(RegistryError::missing_role(Role::Institution, *caller))
                .map_err(rejected(SERVICE, "create_diploma"));
        }
        let id = state.book.issue(student, institution, program, issue_date);
        tracing::info!(service = SERVICE, %caller, %student, %id, program, "diploma issued");
        Ok(id)
    }

    /// The diploma stored under `id`. `None` for id 0 and ids never issued.
    pub fn diploma(&self, id: DiplomaId) -> Option<Diploma> {
        self.state.lock().book.get(id).cloned()
    }

    /// Number of diplomas issued by this registry.
    pub fn diploma_count(&self) -> usize {
        self.state.lock().book.len()
    }

    /// Point this registry at an institution registry. Admin only.
    pub fn set_institution_registry_address(
        &self,
        caller: &Identity,
        address: Identity,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state
            .admin
            .ensure_admin(caller)
            .map_err(rejected(SERVICE, "set_institution_registry_address"))?;
        let previous = state.institution_registry.bind(address);
        tracing::debug!(
            service = SERVICE,
            dependency = "institution_registry",
            %address,
            previous = ?previous,
            "binding updated"
        );
        Ok(())
    }

    /// The bound institution registry address, if set.
    pub fn institution_registry_address(&self) -> Option<Identity> {
        self.state.lock().institution_registry.address()
    }

    /// Copy of the full service state.
    pub fn snapshot(&self) -> DiplomaRegistrySnapshot {
        let state = self.state.lock();
        DiplomaRegistrySnapshot {
            address: self.address,
            admin: state.admin.admin(),
            roles: state.roles.clone(),
            book: state.book.clone(),
            institution_registry: state.institution_registry.clone(),
        }
    }
}

impl Administered for DiplomaRegistry {
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
