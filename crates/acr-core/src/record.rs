//! # Entity Records
//!
//! The immutable (or append-only) records held by the registry services.
//! Each record is owned by exactly one service; other services refer to it
//! only by id or identity.

use serde::{Deserialize, Serialize};

use crate::identity::{DiplomaId, Identity, TransactionId};

/// An institution known to the institution registry.
///
/// Records only ever move from unregistered to authorized; they are never
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    /// Display name supplied at registration.
    pub name: String,
    /// Whether the institution is authorized. `true` for every stored record.
    pub is_authorized: bool,
}

impl Institution {
    /// A freshly registered, authorized institution.
    pub fn authorized(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_authorized: true,
        }
    }
}

/// A student and the diplomas linked to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Display name supplied at registration.
    pub name: String,
    /// Linked diploma ids in linking order. Append-only; duplicates allowed.
    pub diploma_ids: Vec<DiplomaId>,
}

impl Student {
    /// A newly registered student with no diplomas.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diploma_ids: Vec::new(),
        }
    }
}

/// An issued diploma. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diploma {
    /// Store-local id, never 0.
    pub id: DiplomaId,
    /// Holder of the diploma.
    pub student: Identity,
    /// Issuing institution's name as given by the issuer.
    pub institution: String,
    /// Program of study.
    pub program: String,
    /// Issue date as an integer timestamp chosen by the issuer.
    pub issue_date: u64,
}

/// A recorded interaction between two identities. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Log-local id, never 0.
    pub id: TransactionId,
    /// Initiating identity.
    pub sender: Identity,
    /// Receiving identity.
    pub receiver: Identity,
    /// Free-form type label, stored verbatim.
    pub transaction_type: String,
    /// Integer timestamp chosen by the recorder.
    pub timestamp: u64,
}
