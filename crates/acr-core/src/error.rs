//! # Error Types
//!
//! The failure taxonomy shared by every registry service. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every variant is raised before any state is touched. A call that
//!   returns an error has had no effect.
//! - Authorization failures name both the permission that was required and
//!   the caller that lacked it.
//! - Reads never produce errors; missing records surface as `None` or as
//!   an empty collection.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::identity::Identity;
use crate::role::Role;

/// Permission an operation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "role")]
pub enum Permission {
    /// The caller must be the service's current admin.
    Admin,
    /// The caller must hold this role in the service's role table.
    Role(Role),
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Role(Role::None) => f.write_str("unassigned identities"),
            Self::Role(Role::Admin) => f.write_str("admins"),
            Self::Role(Role::Institution) => f.write_str("institutions"),
            Self::Role(Role::Student) => f.write_str("students"),
            Self::Role(Role::Employer) => f.write_str("employers"),
        }
    }
}

/// Kind of create-once entity referenced by a registration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// An institution record in the institution registry.
    Institution,
    /// A student record in the student registry.
    Student,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Institution => f.write_str("Institution"),
            Self::Student => f.write_str("Student"),
        }
    }
}

/// Error returned by every mutating registry operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller does not satisfy the operation's required permission.
    #[error("Only {required} can perform this action (caller {caller})")]
    Unauthorized {
        /// What the operation required.
        required: Permission,
        /// Who attempted it.
        caller: Identity,
    },

    /// A required identity parameter was the zero identity.
    #[error("{parameter} address cannot be zero address")]
    InvalidAddress {
        /// Human name of the offending parameter ("User", "New admin").
        parameter: &'static str,
    },

    /// A create-once entity already has a record.
    #[error("{kind} already registered: {identity}")]
    AlreadyRegistered {
        /// Entity kind.
        kind: EntityKind,
        /// Identity that is already registered.
        identity: Identity,
    },

    /// An entity that must pre-exist has no record.
    #[error("{kind} not registered: {identity}")]
    NotRegistered {
        /// Entity kind.
        kind: EntityKind,
        /// Identity that has no record.
        identity: Identity,
    },

    /// A role name did not parse to a grantable role.
    #[error("invalid role: {0:?}")]
    InvalidRole(String),
}

impl RegistryError {
    /// Caller is not the service admin.
    pub fn not_admin(caller: Identity) -> Self {
        Self::Unauthorized {
            required: Permission::Admin,
            caller,
        }
    }

    /// Caller does not hold `role`.
    pub fn missing_role(role: Role, caller: Identity) -> Self {
        Self::Unauthorized {
            required: Permission::Role(role),
            caller,
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::InvalidAddress { .. } => "INVALID_ADDRESS",
            Self::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            Self::NotRegistered { .. } => "NOT_REGISTERED",
            Self::InvalidRole(_) => "INVALID_ROLE",
        }
    }
}
