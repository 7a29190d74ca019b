//! # acr-cli: CLI Tool for the Credential Registry
//!
//! Provides the `acr` command-line interface.
//!
//! ## Subcommands
//!
//! - `acr bootstrap`: Deploy the six services and run the bind phase.
//! - `acr run`: Execute a YAML scenario of registry calls and report the
//!   outcome of each step along with the final state.
//!
//! ```bash
//! acr bootstrap --deployer 0x00000000000000000000000000000000000000a1
//! acr -v run scenarios/diploma_issuance.yaml --fail-fast
//! acr --log-format json run --config scenarios/diploma_issuance.yaml
//! ```

pub mod bootstrap;
pub mod logging;
pub mod scenario;

use std::path::Path;

use anyhow::{Context, Result};

/// Write `content` to `out`, or to stdout when `out` is `None`.
pub fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, format!("{content}\n"))
            .with_context(|| format!("failed to write output: {}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
