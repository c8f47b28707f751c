use console::style;

use crate::context::Context;
use crate::error::FatalError;
use crate::gateway::{CommandLine, Mode};

/// Create the environment once, then install the pinned packages on every run.
pub fn ensure(ctx: &mut Context) -> Result<(), FatalError> {
    let venv = ctx.settings.venv_dir();
    if venv.exists() {
        tracing::debug!("Environment exists at {}", venv.display());
    } else {
        println!("  {} Creating environment at {}", style("→").dim(), venv.display());
        let cmd = CommandLine::new(ctx.settings.interpreter.as_str())
            .args(["-m", "venv"])
            .arg(venv.to_string_lossy());
        run(ctx, &cmd, "environment")?;
    }

    if ctx.settings.pinned_packages.is_empty() {
        return Ok(());
    }
    let pip = ctx.settings.venv_bin("pip");
    let cmd = CommandLine::new(pip.to_string_lossy())
        .args(["install", "--quiet", "--upgrade"])
        .args(ctx.settings.pinned_packages.iter().cloned());
    run(ctx, &cmd, "dependencies")?;

    println!(
        "  {} Environment ready ({} packages)",
        style("✓").green(),
        ctx.settings.pinned_packages.len()
    );
    Ok(())
}

fn run(ctx: &mut Context, cmd: &CommandLine, step: &'static str) -> Result<(), FatalError> {
    let out = ctx
        .gateway
        .invoke(cmd, Mode::Captured)
        .map_err(|e| FatalError::setup(step, e))?;
    if out.success() {
        return Ok(());
    }
    let stderr = out.stderr().trim();
    let reason = match stderr.lines().last() {
        Some(line) => format!("`{cmd}` failed: {line}"),
        None => format!("`{cmd}` exited with {:?}", out.exit_code),
    };
    Err(FatalError::setup(step, reason))
}
