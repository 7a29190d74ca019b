//! # Institution Registry
//!
//! Admin-curated list of authorized institutions. A record is created once
//! per identity and never changes afterwards.

use std::collections::BTreeMap;

use acr_core::{EntityKind, Identity, Institution, RegistryError};
use parking_lot::Mutex;
use serde::Serialize;

use crate::access::{rejected, AdminSlot, Administered};

const SERVICE: &str = "institution_registry";

#[derive(Debug)]
struct InstitutionState {
    admin: AdminSlot,
    institutions: BTreeMap<Identity, Institution>,
}

/// Registry of authorized institutions.
#[derive(Debug)]
pub struct InstitutionRegistry {
    address: Identity,
    state: Mutex<InstitutionState>,
}

/// Complete state of an [`InstitutionRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstitutionSnapshot {
    pub address: Identity,
    pub admin: Identity,
    pub institutions: BTreeMap<Identity, Institution>,
}

impl InstitutionRegistry {
    /// Deploy a new instance at `address`, administered by `deployer`.
    pub fn new(address: Identity, deployer: Identity) -> Result<Self, RegistryError> {
        let admin = AdminSlot::new(deployer)?;
        tracing::debug!(service = SERVICE, %address, %deployer, "service deployed");
        Ok(Self {
            address,
            state: Mutex::new(InstitutionState {
                admin,
                institutions: BTreeMap::new(),
            }),
        })
    }

    /// Register `institution` under `name` as authorized. Admin only.
    ///
    /// Fails with `AlreadyRegistered` if the identity has a record, leaving
    /// that record untouched. The name is stored as given, empty included;
    /// duplicates are detected by identity alone.
    pub fn register_institution(
        &self,
        caller: &Identity,
        name: &str,
        institution: Identity,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state
            .admin
            .ensure_admin(caller)
            .map_err(rejected(SERVICE, "register_institution"))?;
        if state.institutions.contains_key(&institution) {
            return Err(RegistryError::AlreadyRegistered {
                kind: EntityKind::Institution,
                identity: institution,
            })
            .map_err(rejected(SERVICE, "register_institution"));
        }
        state
            .institutions
            .insert(institution, Institution::authorized(name));
        tracing::info!(service = SERVICE, %caller, %institution, name, "institution registered");
        Ok(())
    }

    /// Whether `institution` is registered and authorized.
    pub fn verify_institution(&self, institution: &Identity) -> bool {
        self.state
            .lock()
            .institutions
            .get(institution)
            .is_some_and(|record| record.is_authorized)
    }

    /// The stored record for `institution`, if any.
    pub fn institution(&self, institution: &Identity) -> Option<Institution> {
        self.state.lock().institutions.get(institution).cloned()
    }

    /// Copy of the full service state.
    pub fn snapshot(&self) -> InstitutionSnapshot {
        let state = self.state.lock();
        InstitutionSnapshot {
            address: self.address,
            admin: state.admin.admin(),
            institutions: state.institutions.clone(),
        }
    }
}

impl Administered for InstitutionRegistry {
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
