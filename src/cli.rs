use clap::Parser;

/// Takes no options: everything happens in the interactive menu.
#[derive(Parser)]
#[command(
    name = "council",
    about = "Start the local AI Council: bootstrap the model daemon, then open the menu."
)]
#[command(version)]
pub struct Cli {}
