//! One-time readiness sequence run before the menu.

pub mod config;
pub mod data_dirs;
pub mod environment;
pub mod models;
pub mod performance;
pub mod prereq;

use console::style;

use crate::context::Context;
use crate::daemon;
use crate::error::FatalError;

/// What the last bootstrap established. Derived on every run, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Readiness {
    pub interpreter_present: bool,
    pub daemon_binary_present: bool,
    pub daemon_reachable: bool,
    pub config_present: bool,
    pub models_ready: bool,
    pub env_ready: bool,
    pub perf_optimized: bool,
}

impl Readiness {
    pub fn print_summary(&self) {
        let mark = |ok: bool| {
            if ok {
                style("✓").green().bold().to_string()
            } else {
                style("⚠").yellow().to_string()
            }
        };
        println!();
        println!("  {} Interpreter", mark(self.interpreter_present));
        println!("  {} Daemon binary", mark(self.daemon_binary_present));
        println!("  {} Daemon reachable", mark(self.daemon_reachable));
        println!("  {} Configuration", mark(self.config_present));
        println!("  {} Models", mark(self.models_ready));
        println!("  {} Environment", mark(self.env_ready));
        println!("  {} Performance tuning", mark(self.perf_optimized));
        println!();
    }
}

/// Run every step in order. The first fatal error stops the sequence.
pub async fn run(ctx: &mut Context) -> Result<Readiness, FatalError> {
    let mut state = Readiness::default();

    step("Checking prerequisites");
    prereq::check(ctx, &mut state).await?;

    step("Checking configuration");
    let config_path = config::ensure(ctx)?;
    state.config_present = true;

    step("Preparing data directories");
    data_dirs::ensure(&ctx.settings)?;

    step("Checking models");
    let required = crate::config::required_models(&config_path);
    match daemon::list_installed(ctx.gateway.as_mut(), &ctx.settings) {
        Ok(installed) => {
            let report = models::provision(ctx, &required, &installed)?;
            state.models_ready = report.ready();
        }
        // Nothing to compare against while the daemon is down
        Err(reason) if !state.daemon_reachable => {
            println!(
                "  {} Daemon offline, skipping model check (use Models → Download missing later)",
                style("⚠").yellow()
            );
            tracing::warn!("Model inventory unavailable: {reason}");
        }
        Err(reason) => return Err(FatalError::setup("model inventory", reason)),
    }

    step("Preparing environment");
    environment::ensure(ctx)?;
    state.env_ready = true;

    step("Checking performance tuning");
    state.perf_optimized = performance::report(&ctx.settings);

    tracing::info!("Bootstrap complete: {state:?}");
    Ok(state)
}

fn step(label: &str) {
    println!("{} {}", style("→").cyan(), style(label).bold());
}
