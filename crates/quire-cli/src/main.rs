mod cli;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::QuireConfig;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Map(args) => {
            let config = QuireConfig::load_or_default(&cli.config)?;
            cli::map::run(args, config)
        }
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &cli.config),
    }
}
