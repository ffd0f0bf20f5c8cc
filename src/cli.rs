//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Mirror git repositories and keep gitolite ACLs in sync with disk
#[derive(Parser, Debug)]
#[command(name = "git-mirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror-clone (or update) a single repository
    Clone(commands::clone::CloneArgs),

    /// Fetch updates for all mirrors under the base directory
    #[command(name = "update-all")]
    UpdateAll(commands::update::UpdateAllArgs),

    /// List detected mirror repositories
    List(commands::list::ListArgs),

    /// Add one mirror's read-only stanza to the gitolite config
    Add(commands::add::AddArgs),

    /// Reconcile the gitolite config with on-disk mirrors
    Sync(commands::sync::SyncArgs),

    /// Report mirrors versus gitolite configuration
    Status(commands::status::StatusArgs),

    /// Read or write `.git-mirror.conf` settings
    Config(commands::config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Clone(args) => commands::clone::execute(args),
            Commands::UpdateAll(args) => commands::update::execute(args),
            Commands::List(args) => commands::list::execute(args),
            Commands::Add(args) => commands::add::execute(args),
            Commands::Sync(args) => commands::sync::execute(args),
            Commands::Status(args) => commands::status::execute(args),
            Commands::Config(args) => commands::config::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
