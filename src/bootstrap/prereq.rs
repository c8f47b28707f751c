use console::style;

use super::Readiness;
use crate::context::Context;
use crate::daemon::{self, ServiceStatus};
use crate::error::FatalError;

const INTERPRETER_HINT: &str = "install Python 3 with venv support (e.g. `sudo apt install python3 python3-venv`)";
const DAEMON_HINT: &str = "install Ollama: curl -fsSL https://ollama.com/install.sh | sh";

/// Verify the interpreter and daemon binaries, then make sure the daemon
/// answers. An unreachable daemon is a warning, not a failure.
pub async fn check(ctx: &mut Context, state: &mut Readiness) -> Result<(), FatalError> {
    let interpreter = ctx.settings.interpreter.clone();
    if !ctx.gateway.which(&interpreter) {
        return Err(FatalError::MissingDependency {
            name: interpreter,
            hint: INTERPRETER_HINT.to_string(),
        });
    }
    state.interpreter_present = true;

    let binary = ctx.settings.daemon_binary.clone();
    if !ctx.gateway.which(&binary) {
        return Err(FatalError::MissingDependency {
            name: binary,
            hint: DAEMON_HINT.to_string(),
        });
    }
    state.daemon_binary_present = true;
    println!("  {} {interpreter} and {binary} found", style("✓").green());

    state.daemon_reachable = ensure_daemon(ctx).await;
    Ok(())
}

/// One remediation attempt, then a bounded health poll.
async fn ensure_daemon(ctx: &mut Context) -> bool {
    let url = ctx.settings.daemon_url.clone();
    if daemon::probe(&url).await {
        println!("  {} Daemon reachable at {url}", style("✓").green());
        return true;
    }

    println!("  {} Daemon not responding at {url}, starting it", style("⚠").yellow());
    let status = daemon::service_status(ctx.gateway.as_mut(), &ctx.settings.service_name);
    tracing::info!("Daemon service status: {status:?}");

    let launched = match status {
        // Running but not answering: a start would be a no-op
        ServiceStatus::Active => daemon::restart_service(ctx.gateway.as_mut(), &ctx.settings),
        ServiceStatus::Inactive => daemon::start_service(ctx.gateway.as_mut(), &ctx.settings),
        ServiceStatus::Unknown => daemon::spawn_unmanaged(ctx.gateway.as_mut(), &ctx.settings),
    };
    if !launched {
        println!("  {} Could not start the daemon", style("⚠").yellow());
    }

    let attempts = ctx.settings.health_poll_attempts();
    let healthy =
        daemon::wait_until_healthy(&url, attempts, ctx.settings.health_poll_interval()).await;

    if healthy {
        println!("  {} Daemon started", style("✓").green());
    } else {
        println!(
            "  {} Daemon still unreachable after {} checks; continuing",
            style("⚠").yellow(),
            attempts
        );
        tracing::warn!("Daemon unreachable at {url}");
    }
    healthy
}
