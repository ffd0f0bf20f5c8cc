//! Config command implementation

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use git_mirror::config::{get_value, set_value};

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,

    /// Base directory for mirrors (where .git-mirror.conf lives)
    #[arg(long, value_name = "PATH", env = "GIT_MIRROR_BASE_DIR", global = true)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the value of a settings key
    Get { key: String },
    /// Set a settings key
    Set { key: String, value: String },
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let base_dir = super::resolve_base_dir(args.base_dir)?;

    match args.action {
        ConfigAction::Get { key } => match get_value(&base_dir, &key)? {
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => bail!("{} is not set", key),
        },
        ConfigAction::Set { key, value } => {
            set_value(&base_dir, &key, &value)?;
            Ok(())
        }
    }
}
