//! # Identities and Record Ids
//!
//! Newtype wrappers for the identifiers used across the registry. An
//! [`Identity`] names an actor (a person, an institution, or a deployed
//! service); [`DiplomaId`] and [`TransactionId`] name records inside a
//! single service.
//!
//! ## Invariant
//!
//! The zero identity (`0x0000…0000`) means "unset". It parses and
//! serializes like any other identity so that services can reject it with
//! [`RegistryError::InvalidAddress`](crate::RegistryError::InvalidAddress)
//! instead of failing at the parsing layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length in bytes of an account address.
pub const IDENTITY_LEN: usize = 20;

/// An opaque, globally unique actor reference (a 20-byte account address).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; IDENTITY_LEN]);

/// Errors produced when parsing an identity from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityParseError {
    /// The string did not start with `0x`.
    #[error("identity must start with 0x: {0:?}")]
    MissingPrefix(String),

    /// The hex body had the wrong number of digits.
    #[error("identity must have {expected} hex digits, got {actual}")]
    InvalidLength {
        /// Required digit count.
        expected: usize,
        /// Digits found.
        actual: usize,
    },

    /// The hex body contained a non-hex character.
    #[error("invalid hex digit {0:?} in identity")]
    InvalidDigit(char),
}

impl Identity {
    /// The reserved "unset" identity.
    pub const ZERO: Identity = Identity([0u8; IDENTITY_LEN]);

    /// Build an identity whose low 8 bytes hold `value` (big-endian).
    ///
    /// `from_low_u64(0)` is [`Identity::ZERO`].
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; IDENTITY_LEN];
        bytes[IDENTITY_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Derive the address of a service deployed by `deployer` at `nonce`.
    ///
    /// The address is the first 20 bytes of `SHA-256(deployer || nonce_be)`,
    /// so the same deployer and nonce always yield the same address.
    pub fn derive(deployer: &Identity, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(deployer.0);
        hasher.update(nonce.to_be_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; IDENTITY_LEN];
        bytes.copy_from_slice(&digest[..IDENTITY_LEN]);
        Self(bytes)
    }

    /// Whether this is the reserved zero identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; IDENTITY_LEN]
    }

    /// Render as a `0x`-prefixed lowercase hex string.
    pub fn to_hex(&self) -> String {
        let body: String = self.0.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{body}")
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| IdentityParseError::MissingPrefix(s.to_string()))?;

        if let Some(c) = body.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(IdentityParseError::InvalidDigit(c));
        }
        // Every char is an ASCII hex digit from here on, so bytes are digits.
        if body.len() != IDENTITY_LEN * 2 {
            return Err(IdentityParseError::InvalidLength {
                expected: IDENTITY_LEN * 2,
                actual: body.len(),
            });
        }

        let mut bytes = [0u8; IDENTITY_LEN];
        for (i, pair) in body.as_bytes().chunks_exact(2).enumerate() {
            bytes[i] = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
        }
        Ok(Self(bytes))
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.to_hex()
    }
}

// ─── Record ids ──────────────────────────────────────────────────────

/// Identifier of a diploma within one diploma store.
///
/// Assigned monotonically starting at 1. Id 0 is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiplomaId(pub u64);

/// Identifier of a recorded transaction within one transaction log.
///
/// Assigned monotonically starting at 1. Id 0 is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl DiplomaId {
    /// The first id a diploma store assigns.
    pub const FIRST: DiplomaId = DiplomaId(1);

    /// The raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(&self) -> DiplomaId {
        DiplomaId(self.0 + 1)
    }
}

impl TransactionId {
    /// The first id a transaction log assigns.
    pub const FIRST: TransactionId = TransactionId(1);

    /// The raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(&self) -> TransactionId {
        TransactionId(self.0 + 1)
    }
}

impl fmt::Display for DiplomaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diploma:{}", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transaction:{}", self.0)
    }
}
