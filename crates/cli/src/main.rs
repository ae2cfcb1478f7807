mod commands;
mod harness;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::RunCommand;

/// Kessan CLI - period close scenario runner
#[derive(Debug, Parser)]
#[command(
    name = "kessan",
    version,
    about = "Period close scenario runner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute close scenarios
    Run(RunCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run(cmd) => cmd.execute()?,
    };

    std::process::exit(exit_code);
}
