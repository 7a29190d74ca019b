//! # Transaction Log
//!
//! Admin-written, append-only log of interactions between identities.
//! Sender, receiver and type label are stored verbatim with no checks
//! against the other services. The log holds bindings to a diploma
//! registry and a verification service.

use std::collections::BTreeMap;

use acr_core::{Identity, RegistryError, Transaction, TransactionId};
use parking_lot::Mutex;
use serde::Serialize;

use crate::access::{rejected, AdminSlot, Administered};
use crate::binding::ServiceBinding;

const SERVICE: &str = "transaction_log";

#[derive(Debug)]
struct TransactionState {
    admin: AdminSlot,
    next_id: TransactionId,
    transactions: BTreeMap<TransactionId, Transaction>,
    diploma_registry: ServiceBinding,
    verification_service: ServiceBinding,
}

/// Append-only transaction log.
#[derive(Debug)]
pub struct TransactionLog {
    address: Identity,
    state: Mutex<TransactionState>,
}

/// Complete state of a [`TransactionLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionLogSnapshot {
    pub address: Identity,
    pub admin: Identity,
    pub next_id: TransactionId,
    pub transactions: BTreeMap<TransactionId, Transaction>,
    pub diploma_registry: ServiceBinding,
    pub verification_service: ServiceBinding,
}

impl TransactionLog {
    /// Deploy a new instance at `address`, administered by `deployer`.
    pub fn new(address: Identity, deployer: Identity) -> Result<Self, RegistryError> {
        let admin = AdminSlot::new(deployer)?;
        tracing::debug!(service = SERVICE, %address, %deployer, "service deployed");
        Ok(Self {
            address,
            state: Mutex::new(TransactionState {
                admin,
                next_id: TransactionId::FIRST,
                transactions: BTreeMap::new(),
                diploma_registry: ServiceBinding::unset("diploma_registry"),
                verification_service: ServiceBinding::unset("verification_service"),
            }),
        })
    }

    /// Append a transaction and return its id. Admin only.
    pub fn record_transaction(
        &self,
        caller: &Identity,
        sender: Identity,
        receiver: Identity,
        transaction_type: &str,
        timestamp: u64,
    ) -> Result<TransactionId, RegistryError> {
        let mut state = self.state.lock();
        state
            .admin
            .ensure_admin(caller)
            .map_err(rejected(SERVICE, "record_transaction"))?;
        let id = state.next_id;
        state.transactions.insert(
            id,
            Transaction {
                id,
                sender,
                receiver,
                transaction_type: transaction_type.to_string(),
                timestamp,
            },
        );
        state.next_id = id.next();
        tracing::info!(
            service = SERVICE,
            %caller,
            %sender,
            %receiver,
            %id,
            transaction_type,
            "transaction recorded"
        );
        Ok(id)
    }

    /// The transaction stored under `id`.
    pub fn get_transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.state.lock().transactions.get(&id).cloned()
    }

    /// Number of recorded transactions.
    pub fn transaction_count(&self) -> usize {
        self.state.lock().transactions.len()
    }

    /// Point this log at a diploma registry. Admin only.
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

    /// Point this log at a verification service. Admin only.
    pub fn set_verification_service_address(
        &self,
        caller: &Identity,
        address: Identity,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state
            .admin
            .ensure_admin(caller)
            .map_err(rejected(SERVICE, "set_verification_service_address"))?;
        let previous = state.verification_service.bind(address);
        tracing::debug!(
            service = SERVICE,
            dependency = "verification_service",
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

    /// The bound verification service address, if set.
    pub fn verification_service_address(&self) -> Option<Identity> {
        self.state.lock().verification_service.address()
    }

    /// Copy of the full service state.
    pub fn snapshot(&self) -> TransactionLogSnapshot {
        let state = self.state.lock();
        TransactionLogSnapshot {
            address: self.address,
            admin: state.admin.admin(),
            next_id: state.next_id,
            transactions: state.transactions.clone(),
            diploma_registry: state.diploma_registry.clone(),
            verification_service: state.verification_service.clone(),
        }
    }
}

impl Administered for TransactionLog {
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
