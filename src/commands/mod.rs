//! # CLI Command Implementations
//!
//! One module per subcommand. Each module contains an `Args` struct derived
//! with `clap` and an `execute` function that orchestrates the library
//! calls.
//!
//! Option resolution is shared here: a flag always wins, then the
//! `.git-mirror.conf` settings file in the mirror root, then the built-in
//! default.

pub mod add;
pub mod clone;
pub mod config;
pub mod list;
pub mod status;
pub mod sync;
pub mod update;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use git_mirror::config as settings;
use git_mirror::store::DEFAULT_CONF_FILE;

/// Options shared by every command that touches the gitolite-admin repo.
#[derive(Args, Debug)]
pub struct AdminOpts {
    /// URL of the gitolite-admin repository
    #[arg(long, value_name = "URL", env = "GIT_MIRROR_ADMIN_URL")]
    pub admin_url: Option<String>,

    /// Local checkout path for gitolite-admin
    #[arg(long, value_name = "PATH", env = "GIT_MIRROR_ADMIN_DIR")]
    pub admin_dir: Option<PathBuf>,

    /// Readers group or comma-separated user list for mirror stanzas
    #[arg(long, value_name = "WHO")]
    pub readers: Option<String>,

    /// Gitolite path prefix for mirror stanzas
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Included conf filename inside conf/
    #[arg(long, value_name = "FILE")]
    pub conf_file: Option<String>,
}

/// Fully resolved admin options.
pub struct AdminSettings {
    pub admin_url: String,
    pub admin_dir: PathBuf,
    pub readers: String,
    pub prefix: String,
    pub conf_file: String,
}

fn from_settings(base_dir: Option<&Path>, key: &str) -> Result<Option<String>> {
    match base_dir {
        Some(base) => settings::get_value(base, key)
            .with_context(|| format!("failed to read {} from settings", key)),
        None => Ok(None),
    }
}

/// Resolve admin options from flags, then the settings file under
/// `base_dir` (when there is one), then defaults.
pub fn resolve_admin(base_dir: Option<&Path>, opts: &AdminOpts) -> Result<AdminSettings> {
    let admin_url = match &opts.admin_url {
        Some(url) => url.clone(),
        None => match from_settings(base_dir, "admin-url")? {
            Some(url) => url,
            None => bail!("--admin-url is required (or set admin-url in .git-mirror.conf)"),
        },
    };

    let admin_dir = match &opts.admin_dir {
        Some(dir) => dir.clone(),
        None => match from_settings(base_dir, "admin-dir")? {
            Some(dir) => PathBuf::from(dir),
            None => bail!("--admin-dir is required (or set admin-dir in .git-mirror.conf)"),
        },
    };

    let readers = match &opts.readers {
        Some(readers) => readers.clone(),
        None => from_settings(base_dir, "readers")?.unwrap_or_else(|| "@all".to_string()),
    };
    let prefix = match &opts.prefix {
        Some(prefix) => prefix.clone(),
        None => from_settings(base_dir, "prefix")?.unwrap_or_else(|| "mirrors".to_string()),
    };
    let conf_file = match &opts.conf_file {
        Some(file) => file.clone(),
        None => from_settings(base_dir, "conf-file")?
            .unwrap_or_else(|| DEFAULT_CONF_FILE.to_string()),
    };

    Ok(AdminSettings {
        admin_url,
        admin_dir,
        readers,
        prefix,
        conf_file,
    })
}

/// Resolve the mirror base directory: the flag, or the nearest ancestor
/// carrying a `.git-mirror.conf`.
pub fn resolve_base_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    match settings::find_base_dir(&cwd) {
        Some(dir) => Ok(dir),
        None => bail!("--base-dir is required (no .git-mirror.conf found in any parent directory)"),
    }
}
