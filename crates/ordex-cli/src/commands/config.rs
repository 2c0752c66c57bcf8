//! Config command - inspect and scaffold pipeline configuration.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use ordex_core::OrdexConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as JSON
    Show {
        /// Path to an existing config file
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(default_value = "ordex.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { path } => {
            let config = match path {
                Some(path) => OrdexConfig::from_file(&path)?,
                None => OrdexConfig::default(),
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            OrdexConfig::default().save(&path)?;
            println!("{} {}", style("Wrote").green(), path.display());
        }
    }
    Ok(())
}
