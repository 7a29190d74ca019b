//! # Deployment
//!
//! Instantiates the six services and wires their bindings, in two phases.
//!
//! ## Deploy
//!
//! Services are created in a fixed order. Each service's address is derived
//! from the deployer and its position in that order, so the same deployer
//! always yields the same addresses:
//!
//! | nonce | service |
//! |-------|---------|
//! | 0 | diploma registry |
//! | 1 | student registry |
//! | 2 | institution registry |
//! | 3 | permission service |
//! | 4 | transaction log |
//! | 5 | verification service |
//!
//! ## Bind
//!
//! Run as the deployer, in order:
//!
//! 1. Grant `INSTITUTION` to the institution registry's address in the
//!    permission service.
//! 2. Diploma registry → institution registry.
//! 3. Verification service → diploma registry.
//! 4. Transaction log → diploma registry.
//! 5. Transaction log → verification service.
//!
//! The first failing step aborts the bind and leaves earlier steps applied.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use acr_core::{Identity, RegistryError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::Administered;
use crate::diploma::{DiplomaRegistry, DiplomaRegistrySnapshot};
use crate::institution::{InstitutionRegistry, InstitutionSnapshot};
use crate::permission::{PermissionService, PermissionSnapshot};
use crate::student::{StudentRegistry, StudentSnapshot};
use crate::transaction::{TransactionLog, TransactionLogSnapshot};
use crate::verification::{VerificationService, VerificationSnapshot};

/// The kinds of service a deployment contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    DiplomaRegistry,
    StudentRegistry,
    InstitutionRegistry,
    PermissionService,
    TransactionLog,
    VerificationService,
}

impl ServiceKind {
    /// Every kind, in deployment order.
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::DiplomaRegistry,
        ServiceKind::StudentRegistry,
        ServiceKind::InstitutionRegistry,
        ServiceKind::PermissionService,
        ServiceKind::TransactionLog,
        ServiceKind::VerificationService,
    ];

    /// The deployment nonce used to derive this service's address.
    pub fn nonce(&self) -> u64 {
        match self {
            Self::DiplomaRegistry => 0,
            Self::StudentRegistry => 1,
            Self::InstitutionRegistry => 2,
            Self::PermissionService => 3,
            Self::TransactionLog => 4,
            Self::VerificationService => 5,
        }
    }

    /// Snake-case service name, matching [`Administered::service_name`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiplomaRegistry => "diploma_registry",
            Self::StudentRegistry => "student_registry",
            Self::InstitutionRegistry => "institution_registry",
            Self::PermissionService => "permission_service",
            Self::TransactionLog => "transaction_log",
            Self::VerificationService => "verification_service",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`ServiceKind`] name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown service: {0:?}")]
pub struct UnknownService(pub String);

impl FromStr for ServiceKind {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}

/// One dependency edge as currently bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingEdge {
    /// Service holding the binding.
    pub from: ServiceKind,
    /// Dependency the binding names.
    pub dependency: ServiceKind,
    /// Stored address, if any.
    pub address: Option<Identity>,
    /// Kind of service actually deployed at `address` in this deployment.
    pub resolves_to: Option<ServiceKind>,
}

impl BindingEdge {
    /// Whether the binding points at the service it names.
    pub fn is_consistent(&self) -> bool {
        self.resolves_to == Some(self.dependency)
    }
}

/// The six deployed services.
#[derive(Debug, Clone)]
pub struct Deployment {
    deployer: Identity,
    pub diploma_registry: Arc<DiplomaRegistry>,
    pub student_registry: Arc<StudentRegistry>,
    pub institution_registry: Arc<InstitutionRegistry>,
    pub permission_service: Arc<PermissionService>,
    pub transaction_log: Arc<TransactionLog>,
    pub verification_service: Arc<VerificationService>,
}

/// Complete state of every service in a [`Deployment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSnapshot {
    pub deployer: Identity,
    pub diploma_registry: DiplomaRegistrySnapshot,
    pub student_registry: StudentSnapshot,
    pub institution_registry: InstitutionSnapshot,
    pub permission_service: PermissionSnapshot,
    pub transaction_log: TransactionLogSnapshot,
    pub verification_service: VerificationSnapshot,
    pub bindings: Vec<BindingEdge>,
}

impl Deployment {
    /// Deploy every service with `deployer` as admin. No bindings are set.
    pub fn deploy(deployer: Identity) -> Result<Self, RegistryError> {
        let at = |kind: ServiceKind| Identity::derive(&deployer, kind.nonce());
        let deployment = Self {
            deployer,
            diploma_registry: Arc::new(DiplomaRegistry::new(
                at(ServiceKind::DiplomaRegistry),
                deployer,
            )?),
            student_registry: Arc::new(StudentRegistry::new(
                at(ServiceKind::StudentRegistry),
                deployer,
            )?),
            institution_registry: Arc::new(InstitutionRegistry::new(
                at(ServiceKind::InstitutionRegistry),
                deployer,
            )?),
            permission_service: Arc::new(PermissionService::new(
                at(ServiceKind::PermissionService),
                deployer,
            )?),
            transaction_log: Arc::new(TransactionLog::new(
                at(ServiceKind::TransactionLog),
                deployer,
            )?),
            verification_service: Arc::new(VerificationService::new(
                at(ServiceKind::VerificationService),
                deployer,
            )?),
        };
        tracing::info!(%deployer, "services deployed");
        Ok(deployment)
    }

    /// Run the bind phase as the deployer.
    pub fn bind(&self) -> Result<(), RegistryError> {
        let caller = &self.deployer;
        let institutions = self.institution_registry.address();
        let diplomas = self.diploma_registry.address();
        let verification = self.verification_service.address();

        self.permission_service
            .grant_permission(caller, institutions, "INSTITUTION")?;
        self.diploma_registry
            .set_institution_registry_address(caller, institutions)?;
        self.verification_service
            .set_diploma_registry_address(caller, diplomas)?;
        self.transaction_log
            .set_diploma_registry_address(caller, diplomas)?;
        self.transaction_log
            .set_verification_service_address(caller, verification)?;

        tracing::info!(deployer = %self.deployer, "bindings established");
        Ok(())
    }

    /// Deploy and bind in one step.
    pub fn bootstrap(deployer: Identity) -> Result<Self, RegistryError> {
        let deployment = Self::deploy(deployer)?;
        deployment.bind()?;
        Ok(deployment)
    }

    /// The identity that deployed every service.
    pub fn deployer(&self) -> Identity {
        self.deployer
    }

    /// Every service behind its admin surface, in deployment order.
    pub fn services(&self) -> Vec<(ServiceKind, Arc<dyn Administered>)> {
        ServiceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.service(kind)))
            .collect()
    }

    /// The admin surface of the service of `kind`.
    pub fn service(&self, kind: ServiceKind) -> Arc<dyn Administered> {
        match kind {
            ServiceKind::DiplomaRegistry => {
                Arc::clone(&self.diploma_registry) as Arc<dyn Administered>
            }
            ServiceKind::StudentRegistry => {
                Arc::clone(&self.student_registry) as Arc<dyn Administered>
            }
            ServiceKind::InstitutionRegistry => {
                Arc::clone(&self.institution_registry) as Arc<dyn Administered>
            }
            ServiceKind::PermissionService => {
                Arc::clone(&self.permission_service) as Arc<dyn Administered>
            }
            ServiceKind::TransactionLog => {
                Arc::clone(&self.transaction_log) as Arc<dyn Administered>
            }
            ServiceKind::VerificationService => {
                Arc::clone(&self.verification_service) as Arc<dyn Administered>
            }
        }
    }

    /// The kind of service deployed at `address`, if any.
    pub fn resolve(&self, address: &Identity) -> Option<ServiceKind> {
        let found = self
            .services()
            .into_iter()
            .find(|(_, service)| service.address() == *address)
            .map(|(kind, _)| kind);
        tracing::debug!(%address, resolved = ?found, "address resolved");
        found
    }

    /// Every dependency edge with its current address and what it resolves to.
    pub fn bindings(&self) -> Vec<BindingEdge> {
        let edge = |from, dependency, address: Option<Identity>| BindingEdge {
            from,
            dependency,
            address,
            resolves_to: address.and_then(|addr| self.resolve(&addr)),
        };
        vec![
            edge(
                ServiceKind::DiplomaRegistry,
                ServiceKind::InstitutionRegistry,
                self.diploma_registry.institution_registry_address(),
            ),
            edge(
                ServiceKind::VerificationService,
                ServiceKind::DiplomaRegistry,
                self.verification_service.diploma_registry_address(),
            ),
            edge(
                ServiceKind::TransactionLog,
                ServiceKind::DiplomaRegistry,
                self.transaction_log.diploma_registry_address(),
            ),
            edge(
                ServiceKind::TransactionLog,
                ServiceKind::VerificationService,
                self.transaction_log.verification_service_address(),
            ),
        ]
    }

    /// Copy of every service's state.
    pub fn snapshot(&self) -> DeploymentSnapshot {
        DeploymentSnapshot {
            deployer: self.deployer,
            diploma_registry: self.diploma_registry.snapshot(),
            student_registry: self.student_registry.snapshot(),
            institution_registry: self.institution_registry.snapshot(),
            permission_service: self.permission_service.snapshot(),
            transaction_log: self.transaction_log.snapshot(),
            verification_service: self.verification_service.snapshot(),
            bindings: self.bindings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acr_core::Role;

    fn deployer() -> Identity {
        Identity::from_low_u64(0xa1)
    }

    #[test]
    fn kinds_parse_from_their_names() {
        for kind in ServiceKind::ALL {
            assert_eq!(kind.as_str().parse::<ServiceKind>().unwrap(), kind);
        }
        assert_eq!(
            "registry".parse::<ServiceKind>().unwrap_err(),
            UnknownService("registry".into())
        );
    }

    #[test]
    fn kind_names_match_service_names() {
        let deployment = Deployment::deploy(deployer()).unwrap();
        for (kind, service) in deployment.services() {
            assert_eq!(kind.as_str(), service.service_name());
        }
    }

    #[test]
    fn deploy_leaves_everything_unbound() {
        let deployment = Deployment::deploy(deployer()).unwrap();
        assert!(deployment.bindings().iter().all(|edge| edge.address.is_none()));
        assert_eq!(
            deployment
                .permission_service
                .user_role(&deployment.institution_registry.address()),
            Role::None
        );
    }

    #[test]
    fn addresses_are_distinct_and_deterministic() {
        let a = Deployment::deploy(deployer()).unwrap();
        let b = Deployment::deploy(deployer()).unwrap();
        let mut addresses: Vec<_> = a.services().iter().map(|(_, s)| s.address()).collect();
        let again: Vec<_> = b.services().iter().map(|(_, s)| s.address()).collect();
        assert_eq!(addresses, again);
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), 6);
    }

    #[test]
    fn zero_deployer_rejected() {
        assert!(matches!(
            Deployment::deploy(Identity::ZERO),
            Err(RegistryError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn resolve_unknown_address_is_none() {
        let deployment = Deployment::deploy(deployer()).unwrap();
        assert_eq!(deployment.resolve(&Identity::from_low_u64(7)), None);
        assert_eq!(deployment.resolve(&deployer()), None);
    }

    #[test]
    fn bind_fails_after_permission_admin_moved() {
        let deployment = Deployment::deploy(deployer()).unwrap();
        deployment
            .permission_service
            .transfer_admin(&deployer(), Identity::from_low_u64(2))
            .unwrap();
        assert!(deployment.bind().is_err());
        assert_eq!(deployment.diploma_registry.institution_registry_address(), None);
    }
}
