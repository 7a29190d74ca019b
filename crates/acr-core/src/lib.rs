//! # acr-core: Foundational Types for the Credential Registry
//!
//! This crate is the leaf of the registry workspace. It defines the
//! primitives every service shares: who an actor is, what role it may hold,
//! how records are identified, and how a rejected call is reported.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identities.** An [`Identity`] is a 20-byte account address.
//!    The all-zero address is reserved as "unset" and is representable so
//!    that the registry can reject it with a typed error.
//!
//! 2. **Closed role enum.** Role names are parsed exactly once at the call
//!    boundary via [`Role::parse_grantable`]. Unknown names never reach a
//!    role table.
//!
//! 3. **Typed ids.** [`DiplomaId`] and [`TransactionId`] are distinct types;
//!    id `0` is never assigned.
//!
//! 4. **One error taxonomy.** [`RegistryError`] carries the five failure
//!    kinds shared by every service.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `acr-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod record;
pub mod role;

pub use error::{EntityKind, Permission, RegistryError};
pub use identity::{DiplomaId, Identity, IdentityParseError, TransactionId};
pub use record::{Diploma, Institution, Student, Transaction};
pub use role::Role;
