//! # acr-registry: Credential Registry Services
//!
//! Six independently administered services that together record
//! institutions, students, diplomas and transactions.
//!
//! ## Services
//!
//! - [`PermissionService`]: role lattice with admin-only grant/revoke.
//! - [`InstitutionRegistry`]: create-once institution records.
//! - [`StudentRegistry`]: student records with append-only diploma lists.
//! - [`DiplomaRegistry`]: diploma issuance gated by the `INSTITUTION` role.
//! - [`VerificationService`]: separate admin-written diploma table with
//!   public verification.
//! - [`TransactionLog`]: append-only record of interactions.
//!
//! ## Authorization
//!
//! Every service owns its own [`AdminSlot`], set to the deployer and moved
//! only through [`Administered::transfer_admin`]. Services with role-gated
//! operations also own a [`RoleTable`]. No state is shared between
//! services; dependent services hold a [`ServiceBinding`] to the address of
//! the service they trust.
//!
//! ## Atomicity
//!
//! Each service guards its tables with one `parking_lot::Mutex`. Every
//! mutating call takes the lock once, checks all preconditions, then
//! mutates. A call that returns an error has changed nothing.
//!
//! ## Bootstrap
//!
//! [`Deployment`] creates all six services in a fixed order and wires the
//! bindings between them.

pub mod access;
pub mod binding;
pub mod deployment;
pub mod diploma;
pub mod institution;
pub mod permission;
pub mod student;
pub mod transaction;
pub mod verification;

pub use access::{AdminSlot, Administered, RoleTable};
pub use binding::ServiceBinding;
pub use deployment::{BindingEdge, Deployment, DeploymentSnapshot, ServiceKind, UnknownService};
pub use diploma::{DiplomaBook, DiplomaRegistry, DiplomaRegistrySnapshot};
pub use institution::{InstitutionRegistry, InstitutionSnapshot};
pub use permission::{PermissionService, PermissionSnapshot};
pub use student::{StudentRegistry, StudentSnapshot};
pub use transaction::{TransactionLog, TransactionLogSnapshot};
pub use verification::{VerificationService, VerificationSnapshot};
