//! Update-all command implementation

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use git_mirror::mirror::{fetch_all, record_sync_time};

/// Arguments for the update-all command
#[derive(Args, Debug)]
pub struct UpdateAllArgs {
    /// Base directory for mirrors
    #[arg(long, value_name = "PATH", env = "GIT_MIRROR_BASE_DIR")]
    pub base_dir: Option<PathBuf>,
}

/// Execute the update-all command
pub fn execute(args: UpdateAllArgs) -> Result<()> {
    let base_dir = super::resolve_base_dir(args.base_dir)?;

    let results = fetch_all(&base_dir)?;
    let mut failed = 0usize;
    for (repo, error) in &results {
        match error {
            Some(message) => {
                failed += 1;
                println!("[FAIL] {} :: {}", repo.display(), message);
            }
            None => println!("[OK]   {}", repo.display()),
        }
    }

    record_sync_time(&base_dir)?;
    if failed > 0 {
        bail!("{} of {} mirror(s) failed to update", failed, results.len());
    }
    Ok(())
}
