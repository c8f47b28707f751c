use anyhow::Result;
use console::style;

use crate::context::Context;
use crate::daemon;
use crate::gateway::Mode;
use crate::settings::Settings;
use crate::tools;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TuningHints {
    pub threads: Option<u32>,
    pub gpu_layers: Option<i32>,
}

/// Pull `OLLAMA_NUM_THREAD` and `OLLAMA_NUM_GPU` out of `Environment=` lines.
pub fn parse_tuning(contents: &str) -> TuningHints {
    let mut hints = TuningHints::default();
    for line in contents.lines() {
        let Some(rest) = line.trim().strip_prefix("Environment=") else {
            continue;
        };
        for assignment in rest.split_whitespace() {
            let assignment = assignment.trim_matches('"');
            let Some((key, value)) = assignment.split_once('=') else {
                continue;
            };
            match key {
                "OLLAMA_NUM_THREAD" => hints.threads = value.parse().ok(),
                "OLLAMA_NUM_GPU" => hints.gpu_layers = value.parse().ok(),
                _ => {}
            }
        }
    }
    hints
}

/// Show the daemon's tuning. Returns true when a thread hint was found.
/// Never fails: an absent or unreadable descriptor is only a warning.
pub fn report(settings: &Settings) -> bool {
    let path = &settings.tuning_descriptor;
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("No tuning descriptor at {}: {e}", path.display());
            println!(
                "  {} Daemon not tuned (run Configuration → Optimize performance)",
                style("⚠").yellow()
            );
            return false;
        }
    };

    let hints = parse_tuning(&contents);
    match hints.threads {
        Some(threads) => {
            println!("  {} Daemon threads: {threads}", style("✓").green());
            if let Some(gpu) = hints.gpu_layers {
                println!("      GPU layers: {gpu} (-1 auto, 0 CPU only)");
            }
            true
        }
        None => {
            println!(
                "  {} {} has no thread setting",
                style("⚠").yellow(),
                path.display()
            );
            false
        }
    }
}

/// Run the external tuning tool, then offer a daemon restart.
pub fn optimize(ctx: &mut Context) -> Result<()> {
    let cmd = tools::config(&ctx.settings, "optimize");
    ctx.run_checked(&cmd, Mode::Interactive)?;

    let restart = ctx
        .prompter
        .confirm("Restart the daemon now to apply the new settings?", true)?;
    if !restart {
        println!("  Settings apply on the next daemon restart.");
        return Ok(());
    }

    if daemon::restart_service(ctx.gateway.as_mut(), &ctx.settings) {
        println!("  {} Daemon restarted", style("✓").green());
    } else {
        anyhow::bail!(
            "Daemon restart failed. Try: {}",
            daemon::service_command(&ctx.settings, "restart")
        );
    }
    Ok(())
}
