use crate::cli::ConfigCommands;
use crate::config::QuireConfig;
use anyhow::Result;
use std::path::Path;

pub fn run(cmd: ConfigCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(config_path),
        ConfigCommands::Validate => validate(config_path),
    }
}

fn show(config_path: &Path) -> Result<()> {
    let config = QuireConfig::load_or_default(config_path)?;
    match toml::to_string_pretty(&config) {
        Ok(s) => println!("{}", s),
        Err(e) => anyhow::bail!("Failed to serialize config: {}", e),
    }
    Ok(())
}

fn validate(config_path: &Path) -> Result<()> {
    let config = QuireConfig::load(config_path)?;
    match config.validate() {
        Ok(()) => println!("{} is valid.", config_path.display()),
        Err(e) => {
            println!("Validation error in {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    }
    Ok(())
}
