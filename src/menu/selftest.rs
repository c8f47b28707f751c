//! Built-in smoke checks for the council tools.

use console::style;
use std::time::{Duration, Instant};

use crate::context::Context;
use crate::gateway::{CommandLine, Mode};
use crate::tools::{self, Profile, RouterQuery};

const LATENCY_RUNS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyTier {
    Fast,
    Moderate,
    Slow,
}

impl LatencyTier {
    pub fn from_average(avg: Duration) -> Self {
        if avg < Duration::from_secs(3) {
            LatencyTier::Fast
        } else if avg < Duration::from_secs(10) {
            LatencyTier::Moderate
        } else {
            LatencyTier::Slow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LatencyTier::Fast => "fast",
            LatencyTier::Moderate => "moderate",
            LatencyTier::Slow => "slow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct SelfTestReport {
    pub checks: Vec<CheckResult>,
    pub verdict: Option<LatencyTier>,
}

impl SelfTestReport {
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn print(&self) {
        println!();
        for check in &self.checks {
            let mark = if check.passed {
                style("✓").green().bold()
            } else {
                style("✗").red().bold()
            };
            println!("  {mark} {:<28} {}", check.name, style(&check.detail).dim());
        }
        println!();
        println!("  {}/{} checks passed", self.passed(), self.checks.len());
        if let Some(tier) = self.verdict {
            println!("  Response speed: {}", style(tier.label()).bold());
        }
    }
}

/// Run the fixed battery. Failures are recorded, never raised.
pub fn run(ctx: &mut Context) -> SelfTestReport {
    let mut report = SelfTestReport::default();

    let show = tools::config(&ctx.settings, "show");
    report.checks.push(match timed(ctx, &show) {
        Ok(_) => pass("Configuration readable", "config.py show succeeded".into()),
        Err(detail) => fail("Configuration readable", detail),
    });

    let list = tools::chats_list(&ctx.settings);
    report.checks.push(match timed(ctx, &list) {
        Ok(_) => pass("Chat manager lists chats", "chat_manager.py list succeeded".into()),
        Err(detail) => fail("Chat manager lists chats", detail),
    });

    let query = RouterQuery {
        text: &ctx.settings.self_test_query,
        profile: Some(Profile::Simple),
        preprocess: false,
        search: false,
        timing: false,
    }
    .command(&ctx.settings);

    report.checks.push(match timed(ctx, &query) {
        Ok(elapsed) => pass("Sample query", format!("{:.2}s", elapsed.as_secs_f64())),
        Err(detail) => fail("Sample query", detail),
    });

    let mut total = Duration::ZERO;
    let mut failure = None;
    for _ in 0..LATENCY_RUNS {
        match timed(ctx, &query) {
            Ok(elapsed) => total += elapsed,
            Err(detail) => {
                failure = Some(detail);
                break;
            }
        }
    }
    report.checks.push(match failure {
        None => {
            let avg = total / LATENCY_RUNS;
            let tier = LatencyTier::from_average(avg);
            report.verdict = Some(tier);
            pass(
                "Average latency",
                format!("{:.2}s over {LATENCY_RUNS} runs ({})", avg.as_secs_f64(), tier.label()),
            )
        }
        Some(detail) => fail("Average latency", detail),
    });

    report
}

fn timed(ctx: &mut Context, cmd: &CommandLine) -> Result<Duration, String> {
    let started = Instant::now();
    let outcome = ctx.gateway.invoke(cmd, Mode::Captured).map_err(|e| e.to_string())?;
    let elapsed = started.elapsed();
    if outcome.success() {
        Ok(elapsed)
    } else {
        Err(format!("exited with {:?}", outcome.exit_code))
    }
}

fn pass(name: &'static str, detail: String) -> CheckResult {
    CheckResult { name, passed: true, detail }
}

fn fail(name: &'static str, detail: String) -> CheckResult {
    CheckResult { name, passed: false, detail }
}
