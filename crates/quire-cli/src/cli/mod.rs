pub mod config_cmd;
pub mod map;

use clap::{Args, Parser, Subcommand};
use quire_core::ParserBackend;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(version, about = "Map content delivery payloads into graphs and resolve rich text")]
pub struct Cli {
    /// Path to quire.toml
    #[arg(long, global = true, env = "QUIRE_CONFIG", default_value = "quire.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Map a payload file and print the graph and resolved rich text
    Map(MapArgs),
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct MapArgs {
    /// JSON payload of an item or listing response
    pub payload: PathBuf,

    /// Treat the payload as a listing response
    #[arg(long)]
    pub listing: bool,

    /// Rich text backend (overrides config file)
    #[arg(long, env = "QUIRE_BACKEND")]
    pub backend: Option<ParserBackend>,

    /// Fail on linked items missing from the payload
    #[arg(long)]
    pub throw_missing: bool,

    /// Warn about every unresolved link and embed
    #[arg(long)]
    pub advanced_logging: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Check the configuration file
    Validate,
}
