//! # Role Lattice
//!
//! The five roles an identity can hold inside a role table. Exactly one
//! role per identity; identities that were never granted anything read as
//! [`Role::None`].
//!
//! Role names arrive from callers as strings (`"INSTITUTION"`, `"STUDENT"`,
//! ...). They are parsed once, here, into the closed enum. `None` is not a
//! grantable name: removing a role is done by revocation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Role held by an identity within a single service's role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// No role. Default for every identity.
    #[default]
    None,
    /// Administrative role.
    Admin,
    /// Credential issuer.
    Institution,
    /// Credential holder.
    Student,
    /// Credential consumer.
    Employer,
}

impl Role {
    /// Every role that may be granted by name.
    pub const GRANTABLE: [Role; 4] = [Role::Admin, Role::Institution, Role::Student, Role::Employer];

    /// The canonical wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Admin => "ADMIN",
            Self::Institution => "INSTITUTION",
            Self::Student => "STUDENT",
            Self::Employer => "EMPLOYER",
        }
    }

    /// Parse a role name supplied by a caller into a grantable role.
    ///
    /// Matching is exact against the canonical upper-case names. `"NONE"`
    /// and any unknown string are rejected with [`RegistryError::InvalidRole`].
    pub fn parse_grantable(name: &str) -> Result<Role, RegistryError> {
        Self::GRANTABLE
            .into_iter()
            .find(|role| role.as_str() == name)
            .ok_or_else(|| RegistryError::InvalidRole(name.to_string()))
    }

    /// Whether this is the empty role.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_grantable(s)
    }
}
