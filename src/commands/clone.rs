//! Clone command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use git_mirror::mirror::{ensure_mirror, mirror_submodules};

/// Arguments for the clone command
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Git URL (ssh or https) of the upstream repository
    pub url: String,

    /// Base directory for mirrors
    #[arg(long, value_name = "PATH", env = "GIT_MIRROR_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Also mirror submodules declared in the repository, recursively
    #[arg(long)]
    pub submodules: bool,
}

/// Execute the clone command
pub fn execute(args: CloneArgs) -> Result<()> {
    let base_dir = super::resolve_base_dir(args.base_dir)?;

    let target = ensure_mirror(&args.url, &base_dir)?;
    println!("{}", target.display());

    if args.submodules {
        for sub in mirror_submodules(&target, &base_dir)? {
            println!("{}", sub.display());
        }
    }
    Ok(())
}
