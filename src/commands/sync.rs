//! Sync command implementation
//!
//! The full reconciliation run: materialize the admin working copy, scan the
//! mirror root, diff, apply minimal edits, and push iff the document text
//! changed. Safe to re-run; a second run over an unchanged fleet is silent.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use log::warn;

use git_mirror::document::Document;
use git_mirror::reconcile::{reconcile, Policy};
use git_mirror::scan::scan_mirrors;
use git_mirror::store::AdminRepo;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Base directory for mirrors
    #[arg(long, value_name = "PATH", env = "GIT_MIRROR_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    #[command(flatten)]
    pub admin: super::AdminOpts,

    /// Remove stanzas whose mirrors no longer exist on disk
    #[arg(long)]
    pub prune: bool,

    /// Show what would change without committing or pushing
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the sync command
pub fn execute(args: SyncArgs) -> Result<()> {
    let base_dir = super::resolve_base_dir(args.base_dir)?;
    let settings = super::resolve_admin(Some(&base_dir), &args.admin)?;

    let report = scan_mirrors(&base_dir, &settings.prefix)?;
    for dir in &report.bad_layout {
        warn!("bad layout, not configurable: {}", dir.display());
    }

    let admin = AdminRepo::materialize(&settings.admin_url, &settings.admin_dir)?;
    admin.ensure_include(&settings.conf_file)?;

    let mut document = Document::parse(&admin.read_document(&settings.conf_file)?)?;
    let policy = Policy {
        readers: settings.readers.clone(),
        prune: args.prune,
    };
    let outcome = reconcile(&mut document, &report.mirrors, &policy)?;

    for path in &outcome.added {
        println!("[ADDED]   {}", path);
    }
    for path in &outcome.updated {
        println!("[UPDATED] {}", path);
    }
    for path in &outcome.pruned {
        println!("[PRUNED]  {}", path);
    }
    for path in &outcome.orphaned {
        println!("[ORPHAN]  {} (not on disk; use --prune to remove)", path);
    }
    for (identifier, reason) in &outcome.skipped {
        println!("[SKIPPED] {} :: {}", identifier, reason);
    }

    if args.dry_run {
        if outcome.changed {
            println!("[DRY RUN] changes not committed");
        } else {
            println!("[OK] {} already in sync", settings.conf_file);
        }
        return Ok(());
    }

    admin.persist(
        &settings.conf_file,
        &document.to_text(),
        "Sync mirrors.conf with on-disk mirrors",
    )?;

    if !outcome.changed {
        println!("[OK] {} already in sync", settings.conf_file);
    }
    Ok(())
}
