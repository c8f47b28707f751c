use clap::Parser;
use console::style;

use council::bootstrap;
use council::cli::Cli;
use council::context::Context;
use council::gateway::SystemGateway;
use council::menu::Dispatcher;
use council::prompt::TerminalPrompter;
use council::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    // stderr, warn by default; the menu owns stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "council=warn".into()),
        )
        .init();

    let settings = Settings::load()?;
    let mut ctx = Context::new(settings, Box::new(SystemGateway), Box::new(TerminalPrompter));

    println!("{}", style(format!("AI Council v{}", env!("CARGO_PKG_VERSION"))).bold());
    println!();

    let readiness = match bootstrap::run(&mut ctx).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{} {e}", style("✗").red().bold());
            std::process::exit(e.exit_code());
        }
    };
    readiness.print_summary();

    if !atty::is(atty::Stream::Stdin) {
        println!("{} stdin is not a terminal; the menu expects interactive input", style("⚠").yellow());
    }

    Dispatcher::new(ctx).run()
}
