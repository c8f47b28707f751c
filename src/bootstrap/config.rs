use anyhow::Result;
use console::style;
use std::path::PathBuf;

use crate::context::Context;
use crate::error::FatalError;
use crate::gateway::Mode;
use crate::tools;

/// Make sure the council config exists, running the setup wizard if it
/// doesn't. An existing config is never touched.
pub fn ensure(ctx: &mut Context) -> Result<PathBuf, FatalError> {
    let path = ctx.settings.council_config.clone();
    if path.exists() {
        println!("  {} Config at {}", style("✓").green(), path.display());
        return Ok(path);
    }

    println!("  {} No config found, starting setup wizard", style("⚠").yellow());
    run_wizard(ctx)?;

    if path.exists() {
        Ok(path)
    } else {
        Err(FatalError::setup(
            "configuration",
            format!("setup wizard did not create {}", path.display()),
        ))
    }
}

/// Delete the config and run the wizard again. Returns false if the user
/// backed out.
pub fn reset(ctx: &mut Context) -> Result<bool> {
    let path = ctx.settings.council_config.clone();
    let confirmed = ctx.prompter.confirm(
        &format!("Delete {} and run setup again?", path.display()),
        false,
    )?;
    if !confirmed {
        return Ok(false);
    }

    if path.exists() {
        std::fs::remove_file(&path)?;
        tracing::info!("Removed {}", path.display());
    }
    ensure(ctx)?;
    Ok(true)
}

fn run_wizard(ctx: &mut Context) -> Result<(), FatalError> {
    let cmd = tools::config(&ctx.settings, "setup");
    let outcome = ctx
        .gateway
        .invoke(&cmd, Mode::Interactive)
        .map_err(|e| FatalError::setup("configuration", e))?;
    if !outcome.success() {
        tracing::warn!("Setup wizard exited with {:?}", outcome.exit_code);
    }
    Ok(())
}
