use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use nerdfont_cli::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    cli.command.run()
}
