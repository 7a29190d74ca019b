//! # Verification Service
//!
//! Keeps its own diploma table, written by the admin and readable by
//! anyone. It also stores the address of a diploma registry but never
//! delegates to it: records issued here and records issued there live in
//! separate id spaces.

use acr_core::{Diploma, DiplomaId, Identity, RegistryError};
use parking_lot::Mutex;
use serde::Serialize;

use crate::access::{rejected, AdminSlot, Administered};
use crate::binding::ServiceBinding;
use crate::diploma::DiplomaBook;

const SERVICE: &str = "verification_service";

#[derive(Debug)]
struct VerificationState {
    admin: AdminSlot,
    book: DiplomaBook,
    diploma_registry: ServiceBinding,
}

/// Admin-written diploma table with public verification.
#[derive(Debug)]
pub struct VerificationService {
    address: Identity,
    state: Mutex<VerificationState>,
}

/// Complete state of a [`VerificationService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationSnapshot {
    pub address: Identity,
    pub admin: Identity,
    pub book: DiplomaBook,
    pub diploma_registry: ServiceBinding,
}

impl VerificationService {
    /// Deploy a new instance at `address`, administered by `deployer`.
    pub fn new(address: Identity, deployer: Identity) -> Result<Self, RegistryError> {
        let admin = AdminSlot::new(deployer)?;
        tracing::debug!(service = SERVICE, %address, %deployer, "service deployed");
        Ok(Self {
            address,
            state: Mutex::new(VerificationState {
                admin,
                book: DiplomaBook::default(),
                diploma_registry: ServiceBinding::unset("diploma_registry"),
            }),
        })
    }

    /// Store a diploma in this service's table. Admin only.
    pub fn create_diploma(
        &self,
        caller: &Identity,
        student: Identity,
        institution: &str,
        program: &str,
        issue_date: u64,
    ) -> Result<DiplomaId, RegistryError> {
        let mut state = self.state.lock();
        state
            .admin
            .ensure_admin(caller)
            .map_err(rejected(SERVICE, "create_diploma"))?;
        let id = state.book.issue(student, institution, program, issue_date);
        tracing::info!(service = SERVICE, %caller, %student, %id, program, "diploma recorded");
        Ok(id)
    }

    /// Whether `id` names a diploma in this service's table.
    ///
    /// A record whose student is the zero identity counts as absent.
    pub fn verify_diploma(&self, id: DiplomaId) -> bool {
        self.state
            .lock()
            .book
            .get(id)
            .is_some_and(|diploma| !diploma.student.is_zero())
    }

    /// The diploma stored under `id` in this service's table.
    pub fn diploma(&self, id: DiplomaId) -> Option<Diploma> {
        self.state.lock().book.get(id).cloned()
    }

    /// Point this service at a diploma registry. Admin only.
    pub fn set_diploma_registry_address(
        &self,
        caller: &Identity,
        address: Identity,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state
            .admin
            .ensure_admin(caller)
            .map_err(rejected(SERVICE, "set_diploma_registry_address"))?;
        let previous = state.diploma_registry.bind(address);
        tracing::debug!(
            service = SERVICE,
            dependency = "diploma_registry",
            %address,
            previous = ?previous,
            "binding updated"
        );
        Ok(())
    }

    /// The bound diploma registry address, if set.
    pub fn diploma_registry_address(&self) -> Option<Identity> {
        self.state.lock().diploma_registry.address()
    }

    /// Copy of the full service state.
    pub fn snapshot(&self) -> VerificationSnapshot {
        let state = self.state.lock();
        VerificationSnapshot {
            address: self.address,
            admin: state.admin.admin(),
            book: state.book.clone(),
            diploma_registry: state.diploma_registry.clone(),
        }
    }
}

impl Administered for VerificationService {
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
