//! # Admin Hand-over Tests
//!
//! The transfer contract exercised uniformly on all six services through
//! the shared admin surface.

use acr_core::{Identity, RegistryError};
use acr_registry::{Administered, Deployment};

fn a() -> Identity {
    Identity::from_low_u64(0xa)
}

fn b() -> Identity {
    Identity::from_low_u64(0xb)
}

fn outsider() -> Identity {
    Identity::from_low_u64(0xc)
}

#[test]
fn transfer_round_trip_on_every_service() {
    let deployment = Deployment::deploy(a()).unwrap();
    for (kind, service) in deployment.services() {
        service.transfer_admin(&a(), b()).unwrap();
        assert_eq!(service.admin(), b(), "{kind}");

        assert_eq!(
            service.transfer_admin(&a(), a()).unwrap_err(),
            RegistryError::not_admin(a()),
            "{kind}: former admin must be rejected"
        );

        service.transfer_admin(&b(), a()).unwrap();
        assert_eq!(service.admin(), a(), "{kind}");
        assert_eq!(
            service.transfer_admin(&b(), b()).unwrap_err(),
            RegistryError::not_admin(b()),
            "{kind}"
        );
    }
}

#[test]
fn transfer_to_zero_fails_on_every_service_for_every_caller() {
    let deployment = Deployment::deploy(a()).unwrap();
    for (kind, service) in deployment.services() {
        for caller in [a(), outsider()] {
            assert_eq!(
                service.transfer_admin(&caller, Identity::ZERO).unwrap_err(),
                RegistryError::InvalidAddress {
                    parameter: "New admin"
                },
                "{kind}"
            );
        }
        assert_eq!(service.admin(), a(), "{kind}");
    }
}

#[test]
fn transfer_on_one_service_leaves_the_others_alone() {
    let deployment = Deployment::deploy(a()).unwrap();
    deployment.transaction_log.transfer_admin(&a(), b()).unwrap();
    for (kind, service) in deployment.services() {
        let expected = if service.address() == deployment.transaction_log.address() {
            b()
        } else {
            a()
        };
        assert_eq!(service.admin(), expected, "{kind}");
    }
}

#[test]
fn rejected_operations_by_former_admin_change_nothing() {
    let deployment = Deployment::bootstrap(a()).unwrap();
    for (_, service) in deployment.services() {
        service.transfer_admin(&a(), b()).unwrap();
    }
    let before = deployment.snapshot();

    let errors = [
        deployment
            .permission_service
            .grant_permission(&a(), outsider(), "ADMIN")
            .unwrap_err(),
        deployment
            .permission_service
            .revoke_permission(&a(), deployment.institution_registry.address())
            .unwrap_err(),
        deployment
            .institution_registry
            .register_institution(&a(), "U", outsider())
            .unwrap_err(),
        deployment
            .student_registry
            .register_student(&a(), outsider(), "S")
            .unwrap_err(),
        deployment
            .verification_service
            .create_diploma(&a(), outsider(), "U", "P", 0)
            .unwrap_err(),
        deployment
            .transaction_log
            .record_transaction(&a(), a(), b(), "T", 0)
            .unwrap_err(),
        deployment
            .diploma_registry
            .set_institution_registry_address(&a(), outsider())
            .unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err, RegistryError::not_admin(a()));
    }

    assert_eq!(deployment.snapshot(), before);
}
