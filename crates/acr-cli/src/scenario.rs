//! # Scenario Subcommand
//!
//! Runs a scripted sequence of registry calls against a fresh deployment.
//!
//! ## File format
//!
//! ```yaml
//! deployer: "0x00000000000000000000000000000000000000a1"
//! steps:
//!   - call: grant_permission
//!     caller: "0x00000000000000000000000000000000000000a1"
//!     service: diploma_registry
//!     user: "0x00000000000000000000000000000000000000b2"
//!     role: INSTITUTION
//!   - call: create_diploma
//!     caller: "0x00000000000000000000000000000000000000b2"
//!     student: "0x00000000000000000000000000000000000000c3"
//!     institution: Blockchain University
//!     program: Blockchain Development
//!     date: 1700000000
//! ```
//!
//! `user` and binding `address` fields accept either a `0x` identity or
//! the name of a deployed service (`diploma_registry`, ...), which resolves
//! to that service's derived address. Unknown fields are rejected.
//!
//! A rejected call is recorded in the report and execution continues,
//! unless `--fail-fast` is set.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use acr_core::{DiplomaId, Identity, RegistryError, Role, TransactionId};
use acr_registry::{Deployment, DeploymentSnapshot, ServiceKind};

// ─── File Model ─────────────────────────────────────────────────────

/// A scenario file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Identity that deploys, and initially administers, every service.
    pub deployer: Identity,
    /// Whether to run the bind phase before the steps.
    #[serde(default = "default_bind")]
    pub bind: bool,
    /// Calls to make, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_bind() -> bool {
    true
}

/// An identity given literally or by the name of a deployed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Target {
    Identity(Identity),
    Service(ServiceKind),
}

impl TryFrom<String> for Target {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if let Ok(kind) = value.parse::<ServiceKind>() {
            return Ok(Self::Service(kind));
        }
        value
            .parse::<Identity>()
            .map(Self::Identity)
            .map_err(|e| format!("expected an identity or a service name: {e}"))
    }
}

impl Target {
    /// The identity this target names within `deployment`.
    pub fn resolve(&self, deployment: &Deployment) -> Identity {
        match self {
            Self::Identity(identity) => *identity,
            Self::Service(kind) => deployment.service(*kind).address(),
        }
    }
}

/// Service whose role table a grant or revoke writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleAuthority {
    #[default]
    PermissionService,
    DiplomaRegistry,
}

/// Service holding a diploma registry binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiplomaBindingHolder {
    VerificationService,
    TransactionLog,
}

/// One call in a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    GrantPermission {
        caller: Identity,
        #[serde(default)]
        service: RoleAuthority,
        user: Target,
        role: String,
    },
    RevokePermission {
        caller: Identity,
        #[serde(default)]
        service: RoleAuthority,
        user: Target,
    },
    TransferAdmin {
        caller: Identity,
        service: ServiceKind,
        new_admin: Identity,
    },
    RegisterInstitution {
        caller: Identity,
        name: String,
        institution: Identity,
    },
    RegisterStudent {
        caller: Identity,
        student: Identity,
        name: String,
    },
    AddDiplomaToStudent {
        caller: Identity,
        student: Identity,
        diploma: DiplomaId,
    },
    CreateDiploma {
        caller: Identity,
        student: Identity,
        institution: String,
        program: String,
        date: u64,
    },
    CreateVerifiedDiploma {
        caller: Identity,
        student: Identity,
        institution: String,
        program: String,
        date: u64,
    },
    RecordTransaction {
        caller: Identity,
        sender: Identity,
        receiver: Identity,
        #[serde(rename = "type")]
        transaction_type: String,
        timestamp: u64,
    },
    SetInstitutionRegistryAddress {
        caller: Identity,
        address: Target,
    },
    SetDiplomaRegistryAddress {
        caller: Identity,
        service: DiplomaBindingHolder,
        address: Target,
    },
    SetVerificationServiceAddress {
        caller: Identity,
        address: Target,
    },
}

/// Value produced by a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Role(Role),
    Diploma(DiplomaId),
    Transaction(TransactionId),
}

impl Step {
    /// The snake-case call name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GrantPermission { .. } => "grant_permission",
            Self::RevokePermission { .. } => "revoke_permission",
            Self::TransferAdmin { .. } => "transfer_admin",
            Self::RegisterInstitution { .. } => "register_institution",
            Self::RegisterStudent { .. } => "register_student",
            Self::AddDiplomaToStudent { .. } => "add_diploma_to_student",
            Self::CreateDiploma { .. } => "create_diploma",
            Self::CreateVerifiedDiploma { .. } => "create_verified_diploma",
            Self::RecordTransaction { .. } => "record_transaction",
            Self::SetInstitutionRegistryAddress { .. } => "set_institution_registry_address",
            Self::SetDiplomaRegistryAddress { .. } => "set_diploma_registry_address",
            Self::SetVerificationServiceAddress { .. } => "set_verification_service_address",
        }
    }

    /// The identity making the call.
    pub fn caller(&self) -> Identity {
        match self {
            Self::GrantPermission { caller, .. }
            | Self::RevokePermission { caller, .. }
            | Self::TransferAdmin { caller, .. }
            | Self::RegisterInstitution { caller, .. }
            | Self::RegisterStudent { caller, .. }
            | Self::AddDiplomaToStudent { caller, .. }
            | Self::CreateDiploma { caller, .. }
            | Self::CreateVerifiedDiploma { caller, .. }
            | Self::RecordTransaction { caller, .. }
            | Self::SetInstitutionRegistryAddress { caller, .. }
            | Self::SetDiplomaRegistryAddress { caller, .. }
            | Self::SetVerificationServiceAddress { caller, .. } => *caller,
        }
    }

    /// Make the call against `deployment`.
    pub fn apply(&self, deployment: &Deployment) -> std::result::Result<Outcome, RegistryError> {
        let caller = &self.caller();
        match self {
            Self::GrantPermission {
                service, user, role, ..
            } => {
                let user = user.resolve(deployment);
                let granted = match service {
                    RoleAuthority::PermissionService => deployment
                        .permission_service
                        .grant_permission(caller, user, role)?,
                    RoleAuthority::DiplomaRegistry => deployment
                        .diploma_registry
                        .grant_permission(caller, user, role)?,
                };
                Ok(Outcome::Role(granted))
            }
            Self::RevokePermission { service, user, .. } => {
                let user = user.resolve(deployment);
                match service {
                    RoleAuthority::PermissionService => deployment
                        .permission_service
                        .revoke_permission(caller, user)?,
                    RoleAuthority::DiplomaRegistry => deployment
                        .diploma_registry
                        .revoke_permission(caller, user)?,
                }
                Ok(Outcome::Done)
            }
            Self::TransferAdmin {
                service, new_admin, ..
            } => {
                deployment
                    .service(*service)
                    .transfer_admin(caller, *new_admin)?;
                Ok(Outcome::Done)
            }
            Self::RegisterInstitution {
                name, institution, ..
            } => {
                deployment
                    .institution_registry
                    .register_institution(caller, name, *institution)?;
                Ok(Outcome::Done)
            }
            Self::RegisterStudent { student, name, .. } => {
                deployment
                    .student_registry
                    .register_student(caller, *student, name)?;
                Ok(Outcome::Done)
            }
            Self::AddDiplomaToStudent {
                student, diploma, ..
            } => {
                deployment
                    .student_registry
                    .add_diploma_to_student(caller, *student, *diploma)?;
                Ok(Outcome::Done)
            }
            Self::CreateDiploma {
                student,
                institution,
                program,
                date,
                ..
            } => deployment
                .diploma_registry
                .create_diploma(caller, *student, institution, program, *date)
                .map(Outcome::Diploma),
            Self::CreateVerifiedDiploma {
                student,
                institution,
                program,
                date,
                ..
            } => deployment
                .verification_service
                .create_diploma(caller, *student, institution, program, *date)
                .map(Outcome::Diploma),
            Self::RecordTransaction {
                sender,
                receiver,
                transaction_type,
                timestamp,
                ..
            } => deployment
                .transaction_log
                .record_transaction(caller, *sender, *receiver, transaction_type, *timestamp)
                .map(Outcome::Transaction),
            Self::SetInstitutionRegistryAddress { address, .. } => {
                deployment
                    .diploma_registry
                    .set_institution_registry_address(caller, address.resolve(deployment))?;
                Ok(Outcome::Done)
            }
            Self::SetDiplomaRegistryAddress {
                service, address, ..
            } => {
                let address = address.resolve(deployment);
                match service {
                    DiplomaBindingHolder::VerificationService => deployment
                        .verification_service
                        .set_diploma_registry_address(caller, address)?,
                    DiplomaBindingHolder::TransactionLog => deployment
                        .transaction_log
                        .set_diploma_registry_address(caller, address)?,
                }
                Ok(Outcome::Done)
            }
            Self::SetVerificationServiceAddress { address, .. } => {
                deployment
                    .transaction_log
                    .set_verification_service_address(caller, address.resolve(deployment))?;
                Ok(Outcome::Done)
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.name(), self.caller())
    }
}

// ─── Report ─────────────────────────────────────────────────────────

/// A rejected call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Stable error code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl From<&RegistryError> for Rejection {
    fn from(err: &RegistryError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Zero-based position in the scenario.
    pub index: usize,
    pub call: &'static str,
    pub caller: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
}

impl StepReport {
    /// Whether the call succeeded.
    pub fn succeeded(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Result of a whole scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepReport>,
    /// Steps not run because an earlier step was rejected under fail-fast.
    pub skipped: usize,
    pub state: DeploymentSnapshot,
}

impl ScenarioReport {
    /// Number of rejected steps.
    pub fn rejected(&self) -> usize {
        self.steps.iter().filter(|step| !step.succeeded()).count()
    }
}

// ─── Execution ──────────────────────────────────────────────────────

/// Parse a scenario from YAML text.
pub fn parse_scenario(text: &str) -> Result<Scenario> {
    serde_yaml::from_str(text).context("failed to parse scenario YAML")
}

/// Read and parse a scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;
    parse_scenario(&text).with_context(|| format!("in scenario file: {}", path.display()))
}

/// Deploy, optionally bind, then run every step.
pub fn execute(scenario: &Scenario, fail_fast: bool) -> Result<ScenarioReport> {
    let deployment = Deployment::deploy(scenario.deployer).context("deployment failed")?;
    if scenario.bind {
        deployment.bind().context("bind phase failed")?;
    }

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(index, %step, "running step");
        let report = match step.apply(&deployment) {
            Ok(outcome) => StepReport {
                index,
                call: step.name(),
                caller: step.caller(),
                outcome: Some(outcome),
                rejection: None,
            },
            Err(err) => StepReport {
                index,
                call: step.name(),
                caller: step.caller(),
                outcome: None,
                rejection: Some(Rejection::from(&err)),
            },
        };
        let rejected = !report.succeeded();
        steps.push(report);
        if rejected && fail_fast {
            break;
        }
    }

    let skipped = scenario.steps.len() - steps.len();
    Ok(ScenarioReport {
        steps,
        skipped,
        state: deployment.snapshot(),
    })
}

// ─── Subcommand ─────────────────────────────────────────────────────

/// Arguments for the `acr run` subcommand.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Scenario file. Falls back to the `--config` path.
    #[arg(value_name = "SCENARIO_YAML")]
    pub scenario: Option<PathBuf>,

    /// Scenario file to use when no positional path is given.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stop at the first rejected call.
    #[arg(long)]
    pub fail_fast: bool,

    /// Write the JSON report here instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Execute the run subcommand.
///
/// Returns exit code: 0 if every step succeeded, 1 if any was rejected.
pub fn run_scenario(args: &RunArgs) -> Result<u8> {
    let path = match (args.scenario.as_deref(), args.config.as_deref()) {
        (Some(path), _) | (None, Some(path)) => path,
        (None, None) => bail!("no scenario file given: pass a path or --config"),
    };
    let scenario = load_scenario(path)?;
    let report = execute(&scenario, args.fail_fast)?;

    let rendered = serde_json::to_string_pretty(&report).context("failed to render report")?;
    crate::write_output(args.out.as_deref(), &rendered)?;

    let rejected = report.rejected();
    if rejected > 0 {
        tracing::warn!(rejected, skipped = report.skipped, "scenario finished with rejected steps");
        Ok(1)
    } else {
        tracing::info!(steps = report.steps.len(), "scenario finished");
        Ok(0)
    }
}
