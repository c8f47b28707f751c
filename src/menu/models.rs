use anyhow::Result;
use console::style;
use std::collections::BTreeSet;

use crate::bootstrap;
use crate::context::Context;
use crate::daemon;
use crate::gateway::Mode;

pub fn list(ctx: &mut Context) -> Result<()> {
    let cmd = daemon::list_command(&ctx.settings);
    ctx.run_checked(&cmd, Mode::Interactive)?;
    Ok(())
}

/// Required models next to what the daemon has.
pub fn status(ctx: &mut Context) -> Result<()> {
    let required = crate::config::required_models(&ctx.settings.council_config);
    let installed = daemon::list_installed(ctx.gateway.as_mut(), &ctx.settings)
        .map_err(anyhow::Error::msg)?;

    println!("Required models:");
    for name in &required {
        if daemon::is_installed(&installed, name) {
            println!("  {} {name}", style("✓").green());
        } else {
            println!("  {} {name} (missing)", style("✗").red());
        }
    }
    let extra = extra_models(&required, &installed).len();
    if extra > 0 {
        println!("  {extra} other model(s) installed");
    }
    Ok(())
}

/// Installed models that no required name asks for.
pub fn extra_models<'a>(required: &BTreeSet<String>, installed: &'a BTreeSet<String>) -> Vec<&'a str> {
    installed
        .iter()
        .filter(|name| !required.iter().any(|wanted| daemon::satisfies(name, wanted)))
        .map(String::as_str)
        .collect()
}

pub fn provision(ctx: &mut Context) -> Result<()> {
    let required = crate::config::required_models(&ctx.settings.council_config);
    let report = bootstrap::models::ensure(ctx, &required)?;
    if !report.pulled.is_empty() {
        println!("{} Downloaded {} model(s)", style("✓").green(), report.pulled.len());
    }
    Ok(())
}

pub fn pull(ctx: &mut Context) -> Result<()> {
    let name = ctx.prompter.line("Model name (e.g. llama3.2:3b)")?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("No model name given");
    }
    if !bootstrap::models::pull(ctx, name) {
        anyhow::bail!("Pull of {name} failed");
    }
    Ok(())
}

pub fn remove(ctx: &mut Context) -> Result<()> {
    let name = ctx.prompter.line("Model to remove")?;
    let name = name.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("No model name given");
    }
    if !ctx.prompter.confirm(&format!("Remove {name}?"), false)? {
        println!("Kept.");
        return Ok(());
    }
    let cmd = daemon::remove_command(&ctx.settings, &name);
    ctx.run_checked(&cmd, Mode::Captured)?;
    println!("{} Removed {name}", style("✓").green());
    Ok(())
}
