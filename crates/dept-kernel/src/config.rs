//! Session configuration.
//!
//! Loaded from `$XDG_CONFIG_HOME/dept/config.toml` when present:
//!
//! ```toml
//! name = "notes"
//! fs_mode = "local"      # or "memory"
//! cwd = "/home/amy/notes"
//! max_chars = 10000
//! read_only = false      # refuse writes, renames and deletes
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::paths;

/// Separator printed between fan-out branches and by `type`.
pub const DEFAULT_SEPARATOR: &str = "\n─────────────────────────────────────────\n";

/// Maximum characters of a rendered value shown at the prompt.
pub const DEFAULT_MAX_CHARS: usize = 10_000;

/// Which filesystem the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FsMode {
    /// Real filesystem, relative paths resolved against `cwd`.
    #[default]
    Local,
    /// Ephemeral in-memory filesystem.
    Memory,
}

/// Configuration for a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of this session (for identification in logs).
    pub name: String,

    /// Filesystem backing I/O operations.
    pub fs_mode: FsMode,

    /// Working directory that relative paths resolve against.
    pub cwd: PathBuf,

    /// Rendered values are truncated to this many characters.
    pub max_chars: usize,

    /// Separator between branches and between `type` outputs.
    pub separator: String,

    /// REPL history file. `None` uses the XDG default.
    pub history_file: Option<PathBuf>,

    /// Open the local filesystem read-only.
    pub read_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            fs_mode: FsMode::Local,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
            max_chars: DEFAULT_MAX_CHARS,
            separator: DEFAULT_SEPARATOR.to_string(),
            history_file: None,
            read_only: false,
        }
    }
}

impl SessionConfig {
    /// Interactive config: local filesystem, cwd = process working directory.
    pub fn repl() -> Self {
        Self {
            name: "repl".to_string(),
            ..Self::default()
        }
    }

    /// Fully in-memory config rooted at `/`. Used by tests.
    pub fn memory() -> Self {
        Self {
            name: "memory".to_string(),
            fs_mode: FsMode::Memory,
            cwd: PathBuf::from("/"),
            ..Self::default()
        }
    }

    /// Set the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_fs_mode(mut self, mode: FsMode) -> Self {
        self.fs_mode = mode;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns the REPL defaults.
    pub fn load() -> Result<Self> {
        let path = paths::config_file();

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::repl());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Parse configuration from TOML text. Missing keys take defaults.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// History file, falling back to the XDG data directory.
    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(paths::history_file)
    }
}
