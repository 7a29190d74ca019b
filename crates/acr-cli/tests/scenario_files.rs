//! # Scenario File Tests
//!
//! Loads scenario files from disk and runs them through the `run`
//! subcommand handler, checking exit codes and the written report.

use std::io::Write;
use std::path::{Path, PathBuf};

use acr_cli::scenario::{execute, load_scenario, run_scenario, Outcome, RunArgs};
use acr_core::{DiplomaId, Identity, TransactionId};

const DEPLOYER: &str = "0x00000000000000000000000000000000000000a1";
const OUTSIDER: &str = "0x00000000000000000000000000000000000000f6";

fn bundled(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name)
}

fn scenario_file(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp scenario");
    file.write_all(body.as_bytes()).expect("write temp scenario");
    file
}

fn read_report(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("report written");
    serde_json::from_str(&text).expect("report is JSON")
}

#[test]
fn bundled_issuance_scenario_succeeds() {
    let scenario = load_scenario(&bundled("diploma_issuance.yaml")).unwrap();
    let report = execute(&scenario, true).unwrap();

    assert_eq!(report.rejected(), 0);
    assert_eq!(report.skipped, 0);
    let outcomes: Vec<_> = report.steps.iter().map(|step| step.outcome).collect();
    assert_eq!(outcomes[3], Some(Outcome::Diploma(DiplomaId(1))));
    assert_eq!(outcomes[5], Some(Outcome::Diploma(DiplomaId(1))));
    assert_eq!(outcomes[6], Some(Outcome::Transaction(TransactionId(1))));

    let student: Identity = "0x00000000000000000000000000000000000000c3".parse().unwrap();
    assert_eq!(
        report.state.student_registry.students[&student].diploma_ids,
        vec![DiplomaId(1)]
    );
}

#[test]
fn run_writes_report_and_exits_zero() {
    let out = tempfile::tempdir().unwrap();
    let report_path = out.path().join("report.json");
    let args = RunArgs {
        scenario: Some(bundled("diploma_issuance.yaml")),
        out: Some(report_path.clone()),
        ..RunArgs::default()
    };

    assert_eq!(run_scenario(&args).unwrap(), 0);

    let report = read_report(&report_path);
    assert_eq!(report["steps"].as_array().map(Vec::len), Some(7));
    assert_eq!(report["steps"][3]["outcome"]["diploma"], 1);
    assert_eq!(report["state"]["deployer"], DEPLOYER);
}

#[test]
fn rejected_step_exits_one() {
    let file = scenario_file(&format!(
        "deployer: \"{DEPLOYER}\"\nsteps:\n  - call: transfer_admin\n    caller: \"{OUTSIDER}\"\n    service: permission_service\n    new_admin: \"{OUTSIDER}\"\n"
    ));
    let out = tempfile::tempdir().unwrap();
    let report_path = out.path().join("report.json");
    let args = RunArgs {
        scenario: Some(file.path().to_path_buf()),
        out: Some(report_path.clone()),
        ..RunArgs::default()
    };

    assert_eq!(run_scenario(&args).unwrap(), 1);

    let report = read_report(&report_path);
    assert_eq!(report["steps"][0]["rejection"]["code"], "UNAUTHORIZED");
    assert_eq!(report["state"]["permission_service"]["admin"], DEPLOYER);
}

#[test]
fn config_path_is_used_when_no_path_given() {
    let file = scenario_file(&format!("deployer: \"{DEPLOYER}\"\n"));
    let out = tempfile::tempdir().unwrap();
    let args = RunArgs {
        config: Some(file.path().to_path_buf()),
        out: Some(out.path().join("report.json")),
        ..RunArgs::default()
    };
    assert_eq!(run_scenario(&args).unwrap(), 0);
}

#[test]
fn fail_fast_flag_skips_remaining_steps() {
    let file = scenario_file(&format!(
        "deployer: \"{DEPLOYER}\"\nsteps:\n  - call: transfer_admin\n    caller: \"{OUTSIDER}\"\n    service: permission_service\n    new_admin: \"{OUTSIDER}\"\n  - call: transfer_admin\n    caller: \"{DEPLOYER}\"\n    service: permission_service\n    new_admin: \"{OUTSIDER}\"\n"
    ));
    let out = tempfile::tempdir().unwrap();
    let report_path = out.path().join("report.json");
    let args = RunArgs {
        scenario: Some(file.path().to_path_buf()),
        out: Some(report_path.clone()),
        fail_fast: true,
        ..RunArgs::default()
    };

    assert_eq!(run_scenario(&args).unwrap(), 1);

    let report = read_report(&report_path);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["state"]["permission_service"]["admin"], DEPLOYER);
}

#[test]
fn missing_scenario_is_an_error() {
    let args = RunArgs::default();
    assert!(run_scenario(&args).is_err());

    let args = RunArgs {
        scenario: Some(PathBuf::from("/nonexistent/scenario.yaml")),
        ..RunArgs::default()
    };
    let err = run_scenario(&args).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read scenario file"));
}

#[test]
fn malformed_scenario_is_an_error() {
    let file = scenario_file("deployer: [not, an, identity]\n");
    let err = load_scenario(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse scenario YAML"));
}
