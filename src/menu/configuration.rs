use anyhow::Result;
use console::style;

use crate::config::CouncilConfig;
use crate::context::Context;
use crate::gateway::Mode;
use crate::tools;

pub fn show(ctx: &mut Context) -> Result<()> {
    let cmd = tools::config(&ctx.settings, "show");
    ctx.run_checked(&cmd, Mode::Interactive)?;
    Ok(())
}

pub fn wizard(ctx: &mut Context) -> Result<()> {
    let cmd = tools::config(&ctx.settings, "setup");
    ctx.run_checked(&cmd, Mode::Interactive)?;
    Ok(())
}

pub fn reset(ctx: &mut Context) -> Result<()> {
    if crate::bootstrap::config::reset(ctx)? {
        println!("{} Configuration recreated", style("✓").green());
    } else {
        println!("Reset cancelled.");
    }
    Ok(())
}

pub fn credential_status(ctx: &mut Context) -> Result<()> {
    let path = &ctx.settings.council_config;
    let cfg = CouncilConfig::load(path)?;
    if cfg.credential_configured() {
        println!("{} Brave Search API key configured", style("✓").green());
    } else {
        println!("{} Brave Search API key not configured", style("⚠").yellow());
        println!("  Set it with the setup wizard or edit {}", path.display());
    }
    Ok(())
}

/// Hand off to the tuning tool's own check of the override and the
/// running daemon's environment.
pub fn verify_tuning(ctx: &mut Context) -> Result<()> {
    let cmd = tools::config(&ctx.settings, "verify");
    ctx.run_checked(&cmd, Mode::Interactive)?;
    Ok(())
}

/// Record CPU-only inference in the council config, then offer to
/// regenerate the daemon tuning so it takes effect.
pub fn force_cpu(ctx: &mut Context) -> Result<()> {
    if !ctx.prompter.confirm("Switch the daemon to CPU-only inference?", false)? {
        println!("Unchanged.");
        return Ok(());
    }
    let cmd = tools::config(&ctx.settings, "force-cpu");
    ctx.run_checked(&cmd, Mode::Interactive)?;

    if ctx.prompter.confirm("Apply it now (optimize and restart)?", true)? {
        crate::bootstrap::performance::optimize(ctx)?;
    } else {
        println!("  Run Configuration → Optimize performance to apply it.");
    }
    Ok(())
}
