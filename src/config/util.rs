//! Configuration file discovery.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from the current directory.
///
/// ```text
/// /home/user/site/pages/services/  ← cwd
/// /home/user/site/reroute.toml     ← found, site root is /home/user/site
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Walk up from `start` until `config_name` exists.
///
/// An absolute `config_name` is used as-is.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}
