use clap::Parser;

mod commands;
mod progress;

use commands::Commands;
use rpkgkit::Toolkit;

#[derive(Parser)]
#[command(name = "rpkgkit")]
#[command(about = "Hitman resource toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let toolkit = Toolkit::from_user_config();
    let result = cli.command.execute(&toolkit);
    toolkit.shutdown();
    result
}
