mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{batch, link, overlay, recover};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Overlay(args) => overlay::run(&cli, args),
        Commands::Recover(args) => recover::run(&cli, args),
        Commands::Link(args) => link::run(&cli, args),
        Commands::Batch(args) => batch::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
