//! # Settings File
//!
//! Per-mirror-root settings in `.git-mirror.conf` (INI), living at the top
//! of the mirror base directory. Flags always win over settings; settings
//! win over built-in defaults. Recognized keys under `[git-mirror]`:
//! `admin-url`, `admin-dir`, `readers`, `prefix`, `conf-file`.

use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::Result;

pub const CONFIG_FILENAME: &str = ".git-mirror.conf";
const SECTION: &str = "git-mirror";

/// Path of the settings file inside `base_dir`.
pub fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_FILENAME)
}

/// Load settings from `base_dir`; a missing file is an empty configuration.
pub fn load(base_dir: &Path) -> Result<Ini> {
    let path = config_path(base_dir);
    if path.exists() {
        Ok(Ini::load_from_file(path)?)
    } else {
        Ok(Ini::new())
    }
}

/// Return the value for `key`, if set.
pub fn get_value(base_dir: &Path, key: &str) -> Result<Option<String>> {
    let cfg = load(base_dir)?;
    Ok(cfg.get_from(Some(SECTION), key).map(str::to_owned))
}

/// Set `key` to `value` and persist the file.
pub fn set_value(base_dir: &Path, key: &str, value: &str) -> Result<()> {
    let mut cfg = load(base_dir)?;
    cfg.with_section(Some(SECTION)).set(key, value);
    cfg.write_to_file(config_path(base_dir))?;
    Ok(())
}

/// Search upward from `start` for a directory containing the settings file.
pub fn find_base_dir(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if config_path(dir).exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}
