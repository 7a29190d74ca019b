//! # Bootstrap Subcommand
//!
//! Deploys the six services for a deployer, runs the bind phase, and prints
//! the resulting address directory and binding edges as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use acr_core::Identity;
use acr_registry::{BindingEdge, Deployment, ServiceKind};

/// Arguments for the `acr bootstrap` subcommand.
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Deployer identity (0x-prefixed, 40 hex digits).
    #[arg(long)]
    pub deployer: Identity,

    /// Deploy only; leave every binding unset.
    #[arg(long)]
    pub no_bind: bool,

    /// Write the JSON summary here instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// One deployed service in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedService {
    pub kind: ServiceKind,
    pub address: Identity,
    pub admin: Identity,
}

/// Summary of a bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapSummary {
    pub deployer: Identity,
    pub bound: bool,
    pub services: Vec<DeployedService>,
    pub bindings: Vec<BindingEdge>,
}

/// Deploy, optionally bind, and summarize.
pub fn bootstrap(deployer: Identity, bind: bool) -> Result<BootstrapSummary> {
    let deployment = Deployment::deploy(deployer).context("deployment failed")?;
    if bind {
        deployment.bind().context("bind phase failed")?;
    }
    let services = deployment
        .services()
        .into_iter()
        .map(|(kind, service)| DeployedService {
            kind,
            address: service.address(),
            admin: service.admin(),
        })
        .collect();
    Ok(BootstrapSummary {
        deployer: deployment.deployer(),
        bound: bind,
        services,
        bindings: deployment.bindings(),
    })
}

/// Execute the bootstrap subcommand.
pub fn run_bootstrap(args: &BootstrapArgs) -> Result<u8> {
    let summary = bootstrap(args.deployer, !args.no_bind)?;
    let rendered = serde_json::to_string_pretty(&summary).context("failed to render summary")?;
    crate::write_output(args.out.as_deref(), &rendered)?;
    tracing::info!(deployer = %args.deployer, bound = summary.bound, "bootstrap complete");
    Ok(0)
}
