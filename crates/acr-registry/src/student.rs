//! # Student Registry
//!
//! Admin-curated student records. Each record carries the ordered list of
//! diploma ids linked to the student. The list is append-only and this
//! service does not check the ids against any diploma store.

use std::collections::BTreeMap;

use acr_core::{DiplomaId, EntityKind, Identity, RegistryError, Student};
use parking_lot::Mutex;
use serde::Serialize;

use crate::access::{rejected, AdminSlot, Administered};

const SERVICE: &str = "student_registry";

#[derive(Debug)]
struct StudentState {
    admin: AdminSlot,
    students: BTreeMap<Identity, Student>,
}

/// Registry of students and their linked diplomas.
#[derive(Debug)]
pub struct StudentRegistry {
    address: Identity,
    state: Mutex<StudentState>,
}

/// Complete state of a [`StudentRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSnapshot {
    pub address: Identity,
    pub admin: Identity,
    pub students: BTreeMap<Identity, Student>,
}

impl StudentRegistry {
    /// Deploy a new instance at `address`, administered by `deployer`.
    pub fn new(address: Identity, deployer: Identity) -> Result<Self, RegistryError> {
        let admin = AdminSlot::new(deployer)?;
        tracing::debug!(service = SERVICE, %address, %deployer, "service deployed");
        Ok(Self {
            address,
            state: Mutex::new(StudentState {
                admin,
                students: BTreeMap::new(),
            }),
        })
    }

    /// Create a record for `student` with no diplomas. Admin only.
    pub fn register_student(
        &self,
        caller: &Identity,
        student: Identity,
        name: &str,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state
            .admin
            .ensure_admin(caller)
            .map_err(rejected(SERVICE, "register_student"))?;
        if state.students.contains_key(&student) {
            return Err(RegistryError::AlreadyRegistered {
                kind: EntityKind::Student,
                identity: student,
            })
            .map_err(rejected(SERVICE, "register_student"));
        }
        state.students.insert(student, Student::new(name));
        tracing::info!(service = SERVICE, %caller, %student, name, "student registered");
        Ok(())
    }

    /// Append `diploma` to the student's list. Admin only.
    ///
    /// Duplicates are appended as-is.
    pub fn add_diploma_to_student(
        &self,
        caller: &Identity,
        student: Identity,
        diploma: DiplomaId,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state
            .admin
            .ensure_admin(caller)
            .map_err(rejected(SERVICE, "add_diploma_to_student"))?;
        let record = match state.students.get_mut(&student) {
            Some(record) => record,
            None => {
                return Err(RegistryError::NotRegistered {
                    kind: EntityKind::Student,
                    identity: student,
                })
                .map_err(rejected(SERVICE, "add_diploma_to_student"))
            }
        };
        record.diploma_ids.push(diploma);
        tracing::info!(service = SERVICE, %caller, %student, %diploma, "diploma linked to student");
        Ok(())
    }

    /// Diploma ids linked to `student`, in linking order. Empty for unknown
    /// students.
    pub fn student_diplomas(&self, student: &Identity) -> Vec<DiplomaId> {
        self.state
            .lock()
            .students
            .get(student)
            .map(|record| record.diploma_ids.clone())
            .unwrap_or_default()
    }

    /// The stored record for `student`, if any.
    pub fn student(&self, student: &Identity) -> Option<Student> {
        self.state.lock().students.get(student).cloned()
    }

    /// Copy of the full service state.
    pub fn snapshot(&self) -> StudentSnapshot {
        let state = self.state.lock();
        StudentSnapshot {
            address: self.address,
            admin: state.admin.admin(),
            students: state.students.clone(),
        }
    }
}

impl Administered for StudentRegistry {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> Identity {
        Identity::from_low_u64(n)
    }

    fn registry() -> StudentRegistry {
        StudentRegistry::new(id(0xdd), id(1)).unwrap()
    }

    // ── Registration ────────────────────────────────────────────────

    #[test]
    fn registered_student_starts_without_diplomas() {
        let reg = registry();
        reg.register_student(&id(1), id(20), "Ada").unwrap();
        assert_eq!(reg.student(&id(20)), Some(Student::new("Ada")));
        assert!(reg.student_diplomas(&id(20)).is_empty());
    }

    #[test]
    fn duplicate_student_rejected() {
        let reg = registry();
        reg.register_student(&id(1), id(20), "Ada").unwrap();
        let err = reg.register_student(&id(1), id(20), "Grace").unwrap_err();
        assert_eq!(err.code(), "ALREADY_REGISTERED");
        assert_eq!(reg.student(&id(20)).unwrap().name, "Ada");
    }

    #[test]
    fn non_admin_cannot_register() {
        let reg = registry();
        assert_eq!(
            reg.register_student(&id(2), id(20), "Ada").unwrap_err(),
            RegistryError::not_admin(id(2))
        );
        assert_eq!(reg.student(&id(20)), None);
    }

    // ── Diploma linking ─────────────────────────────────────────────

    #[test]
    fn diplomas_append_in_order_with_duplicates() {
        let reg = registry();
        reg.register_student(&id(1), id(20), "Ada").unwrap();
        for n in [3, 1, 3] {
            reg.add_diploma_to_student(&id(1), id(20), DiplomaId(n))
                .unwrap();
        }
        assert_eq!(
            reg.student_diplomas(&id(20)),
            vec![DiplomaId(3), DiplomaId(1), DiplomaId(3)]
        );
    }

    #[test]
    fn linking_to_unregistered_student_fails_without_effect() {
        let reg = registry();
        reg.register_student(&id(1), id(20), "Ada").unwrap();
        let before = reg.snapshot();
        let err = reg
            .add_diploma_to_student(&id(1), id(21), DiplomaId(1))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotRegistered {
                kind: EntityKind::Student,
                identity: id(21),
            }
        );
        assert_eq!(reg.snapshot(), before);
        assert!(reg.student_diplomas(&id(21)).is_empty());
    }

    #[test]
    fn non_admin_cannot_link() {
        let reg = registry();
        reg.register_student(&id(1), id(20), "Ada").unwrap();
        assert!(reg
            .add_diploma_to_student(&id(20), id(20), DiplomaId(1))
            .is_err());
        assert!(reg.student_diplomas(&id(20)).is_empty());
    }

    #[test]
    fn unknown_student_reads_empty() {
        assert!(registry().student_diplomas(&id(99)).is_empty());
    }
}
