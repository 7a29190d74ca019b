//! # Bootstrap Wiring Tests
//!
//! Deploy-then-bind across all six services: fresh admins, binding targets,
//! the institution grant in the permission service, and the address
//! directory used to resolve bindings.

use acr_core::{Identity, Role};
use acr_registry::{Administered, Deployment, ServiceKind};

fn deployer() -> Identity {
    "0x00000000000000000000000000000000000000a1"
        .parse()
        .expect("valid deployer identity")
}

#[test]
fn every_fresh_service_is_administered_by_the_deployer() {
    let deployment = Deployment::deploy(deployer()).unwrap();
    for (kind, service) in deployment.services() {
        assert_eq!(service.admin(), deployer(), "{kind} admin");
        assert_ne!(service.address(), deployer(), "{kind} address");
        assert!(!service.address().is_zero(), "{kind} address");
    }
}

#[test]
fn bind_points_every_edge_at_the_service_it_names() {
    let deployment = Deployment::bootstrap(deployer()).unwrap();
    let edges = deployment.bindings();
    assert_eq!(edges.len(), 4);
    for edge in &edges {
        assert!(edge.is_consistent(), "{edge:?}");
    }

    assert_eq!(
        deployment.diploma_registry.institution_registry_address(),
        Some(deployment.institution_registry.address())
    );
    assert_eq!(
        deployment.verification_service.diploma_registry_address(),
        Some(deployment.diploma_registry.address())
    );
    assert_eq!(
        deployment.transaction_log.diploma_registry_address(),
        Some(deployment.diploma_registry.address())
    );
    assert_eq!(
        deployment.transaction_log.verification_service_address(),
        Some(deployment.verification_service.address())
    );
}

#[test]
fn bind_grants_institution_role_to_the_institution_registry() {
    let deployment = Deployment::bootstrap(deployer()).unwrap();
    let registry = deployment.institution_registry.address();
    assert_eq!(
        deployment.permission_service.user_role(&registry),
        Role::Institution
    );
    // The grant lives in the permission service only.
    assert_eq!(deployment.diploma_registry.user_role(&registry), Role::None);
}

#[test]
fn resolve_maps_each_address_back_to_its_kind() {
    let deployment = Deployment::deploy(deployer()).unwrap();
    for kind in ServiceKind::ALL {
        let address = deployment.service(kind).address();
        assert_eq!(deployment.resolve(&address), Some(kind));
    }
}

#[test]
fn repointing_a_binding_is_visible_in_the_edge_list() {
    let deployment = Deployment::bootstrap(deployer()).unwrap();
    deployment
        .verification_service
        .set_diploma_registry_address(&deployer(), deployment.student_registry.address())
        .unwrap();

    let edge = deployment
        .bindings()
        .into_iter()
        .find(|edge| edge.from == ServiceKind::VerificationService)
        .unwrap();
    assert_eq!(edge.resolves_to, Some(ServiceKind::StudentRegistry));
    assert!(!edge.is_consistent());
}

#[test]
fn binding_to_an_unknown_address_resolves_to_nothing() {
    let deployment = Deployment::bootstrap(deployer()).unwrap();
    deployment
        .transaction_log
        .set_verification_service_address(&deployer(), Identity::ZERO)
        .unwrap();
    let edge = deployment
        .bindings()
        .into_iter()
        .find(|edge| edge.dependency == ServiceKind::VerificationService)
        .unwrap();
    assert_eq!(edge.address, Some(Identity::ZERO));
    assert_eq!(edge.resolves_to, None);
}

#[test]
fn snapshot_serializes_whole_deployment() {
    let deployment = Deployment::bootstrap(deployer()).unwrap();
    let json = serde_json::to_value(deployment.snapshot()).unwrap();
    assert_eq!(json["deployer"], deployer().to_hex());
    assert_eq!(json["bindings"].as_array().map(Vec::len), Some(4));
    assert_eq!(
        json["diploma_registry"]["roles"][deployer().to_hex()],
        "ADMIN"
    );
    assert_eq!(
        json["verification_service"]["diploma_registry"]["address"],
        deployment.diploma_registry.address().to_hex()
    );
}
