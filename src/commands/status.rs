//! Status command implementation
//!
//! Read-only drift report: which mirrors lack a stanza, which stanzas lack a
//! mirror, which directories cannot be mapped at all, and when the fleet was
//! last fetched. Never writes to the admin repository.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use git_mirror::document::Document;
use git_mirror::mirror::read_sync_time;
use git_mirror::scan::scan_mirrors;
use git_mirror::store::AdminRepo;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Base directory for mirrors
    #[arg(long, value_name = "PATH", env = "GIT_MIRROR_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    #[command(flatten)]
    pub admin: super::AdminOpts,
}

/// Execute the status command
pub fn execute(args: StatusArgs) -> Result<()> {
    let base_dir = super::resolve_base_dir(args.base_dir)?;
    let settings = super::resolve_admin(Some(&base_dir), &args.admin)?;

    let report = scan_mirrors(&base_dir, &settings.prefix)?;

    let admin = AdminRepo::materialize(&settings.admin_url, &settings.admin_dir)?;
    let document = Document::parse(&admin.read_document(&settings.conf_file)?)?;
    let configured: BTreeSet<String> = document.identifiers().map(str::to_owned).collect();

    match read_sync_time(&base_dir)? {
        Some(stamp) => println!("Last sync: {}", stamp),
        None => println!("Last sync: never"),
    }

    let mut in_sync = report.bad_layout.is_empty();
    for dir in &report.bad_layout {
        println!("[BAD LAYOUT]   {}", dir.display());
    }
    for path in report.mirrors.difference(&configured) {
        in_sync = false;
        println!("[UNCONFIGURED] {}", path);
    }
    for path in configured.difference(&report.mirrors) {
        in_sync = false;
        println!("[MISSING]      {}", path);
    }

    if in_sync {
        println!("[OK] mirrors and config in sync");
    }
    Ok(())
}
