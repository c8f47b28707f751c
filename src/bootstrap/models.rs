use console::style;
use std::collections::BTreeSet;

use crate::context::Context;
use crate::daemon;
use crate::error::FatalError;
use crate::gateway::Mode;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub missing: Vec<String>,
    pub pulled: Vec<String>,
    pub failed: Vec<String>,
}

impl ProvisionReport {
    pub fn ready(&self) -> bool {
        self.failed.is_empty() && self.pulled.len() == self.missing.len()
    }
}

pub fn missing_models(required: &BTreeSet<String>, installed: &BTreeSet<String>) -> Vec<String> {
    required
        .iter()
        .filter(|name| !daemon::is_installed(installed, name))
        .cloned()
        .collect()
}

/// List the daemon's models, then [`provision`] against that inventory.
pub fn ensure(ctx: &mut Context, required: &BTreeSet<String>) -> Result<ProvisionReport, FatalError> {
    let installed = daemon::list_installed(ctx.gateway.as_mut(), &ctx.settings)
        .map_err(|reason| FatalError::setup("model inventory", reason))?;
    provision(ctx, required, &installed)
}

/// Install whatever part of `required` is not in `installed`, with consent.
///
/// Each missing model is pulled once and independently; one failure does not
/// stop the others. Whether failures are fatal is decided by
/// `abort_on_partial_provision`.
pub fn provision(
    ctx: &mut Context,
    required: &BTreeSet<String>,
    installed: &BTreeSet<String>,
) -> Result<ProvisionReport, FatalError> {
    let missing = missing_models(required, installed);
    if missing.is_empty() {
        println!("  {} All {} required models installed", style("✓").green(), required.len());
        return Ok(ProvisionReport::default());
    }

    println!("  {} Missing models:", style("⚠").yellow());
    for name in &missing {
        println!("      {name}");
    }
    let consent = ctx
        .prompter
        .confirm(&format!("  Download {} model(s) now?", missing.len()), true)
        .map_err(|e| FatalError::setup("model provisioning", e))?;
    if !consent {
        return Err(FatalError::MissingModel { missing });
    }

    let mut report = ProvisionReport {
        missing,
        ..ProvisionReport::default()
    };
    for name in report.missing.clone() {
        if pull(ctx, &name) {
            report.pulled.push(name);
        } else {
            report.failed.push(name);
        }
    }

    if !report.failed.is_empty() {
        println!(
            "  {} Failed to download: {}",
            style("⚠").yellow(),
            report.failed.join(", ")
        );
        if ctx.settings.abort_on_partial_provision {
            return Err(FatalError::MissingModel {
                missing: report.failed,
            });
        }
        tracing::warn!("Continuing with partially provisioned models: {:?}", report.failed);
    }
    Ok(report)
}

/// Pull one model, showing the daemon's progress output.
pub fn pull(ctx: &mut Context, name: &str) -> bool {
    println!("  {} Pulling {name}", style("↓").cyan());
    let cmd = daemon::pull_command(&ctx.settings, name);
    match ctx.gateway.invoke(&cmd, Mode::Interactive) {
        Ok(out) if out.success() => {
            println!("  {} {name}", style("✓").green().bold());
            true
        }
        Ok(out) => {
            tracing::warn!("Pull of {name} exited with {:?}", out.exit_code);
            false
        }
        Err(e) => {
            tracing::warn!("Pull of {name} failed: {e}");
            false
        }
    }
}
