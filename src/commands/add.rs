//! Add command implementation
//!
//! One-shot convenience: given an upstream URL, ensure its mirror has a
//! read-only stanza in the gitolite config, committing and pushing only
//! when the document actually changed.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use git_mirror::document::Document;
use git_mirror::reconcile::{reconcile, Policy};
use git_mirror::repo_id::parse_repo_id;
use git_mirror::store::{AdminRepo, PersistOutcome};

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Upstream git URL (ssh or https)
    pub url: String,

    /// Base directory for mirrors (used for settings lookup)
    #[arg(long, value_name = "PATH", env = "GIT_MIRROR_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    #[command(flatten)]
    pub admin: super::AdminOpts,
}

/// Execute the add command
pub fn execute(args: AddArgs) -> Result<()> {
    let settings = super::resolve_admin(args.base_dir.as_deref(), &args.admin)?;

    let rid = parse_repo_id(&args.url)?;
    let conf_path = rid.conf_path(&settings.prefix);

    let admin = AdminRepo::materialize(&settings.admin_url, &settings.admin_dir)?;
    admin.ensure_include(&settings.conf_file)?;

    let mut document = Document::parse(&admin.read_document(&settings.conf_file)?)?;
    let desired: BTreeSet<String> = std::iter::once(conf_path.clone()).collect();
    let policy = Policy {
        readers: settings.readers.clone(),
        prune: false,
    };
    let outcome = reconcile(&mut document, &desired, &policy)?;
    if let Some((identifier, reason)) = outcome.skipped.first() {
        anyhow::bail!("cannot add {}: {}", identifier, reason);
    }

    let persisted = admin.persist(
        &settings.conf_file,
        &document.to_text(),
        &format!("Add mirror: {}", conf_path),
    )?;

    match persisted {
        PersistOutcome::Committed => println!("UPDATED {}", conf_path),
        PersistOutcome::Unchanged => println!("UNCHANGED {}", conf_path),
    }
    Ok(())
}
