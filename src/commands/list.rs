//! List command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use git_mirror::scan::mirror_dirs;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Base directory for mirrors
    #[arg(long, value_name = "PATH", env = "GIT_MIRROR_BASE_DIR")]
    pub base_dir: Option<PathBuf>,
}

/// Execute the list command
pub fn execute(args: ListArgs) -> Result<()> {
    let base_dir = super::resolve_base_dir(args.base_dir)?;
    for repo in mirror_dirs(&base_dir)? {
        println!("{}", repo.display());
    }
    Ok(())
}
