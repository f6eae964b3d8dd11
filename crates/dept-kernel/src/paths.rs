//! XDG base directory paths for dept.
//!
//! | Purpose | XDG Variable | Default | dept path |
//! |---------|--------------|---------|-----------|
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` | `dept/config.toml` |
//! | Data | `$XDG_DATA_HOME` | `~/.local/share` | `dept/history.txt` |

use std::path::PathBuf;

use directories::BaseDirs;

/// Get the user's home directory.
///
/// Returns `$HOME` or falls back to `/tmp` if not set.
pub fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Get XDG config home directory.
///
/// Returns `$XDG_CONFIG_HOME` or falls back to `~/.config`.
pub fn xdg_config_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_dir().join(".config"))
}

/// Get XDG data home directory.
///
/// Returns `$XDG_DATA_HOME` or falls back to `~/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
}

/// Path of the optional configuration file.
pub fn config_file() -> PathBuf {
    xdg_config_home().join("dept").join("config.toml")
}

/// Default REPL history file.
pub fn history_file() -> PathBuf {
    xdg_data_home().join("dept").join("history.txt")
}
