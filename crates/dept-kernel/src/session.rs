//! Session context: the state an evaluation runs against.
//!
//! A [`Session`] is passed explicitly into every container operation. It owns
//! the current value, the history stack, the registered file list, the
//! filesystem collaborator and the console sink. Clones share state.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use dept_types::{inspect, truncate_chars};

use crate::config::{FsMode, SessionConfig};
use crate::container::Data;
use crate::vfs::{Filesystem, LocalFs, MemoryFs};

/// Where operations send user-facing text (`print`, `type`, I/O notices,
/// settled deferred results in the REPL).
pub trait Console: Send + Sync {
    fn emit(&self, text: &str);
}

/// Console that prints to stdout.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn emit(&self, text: &str) {
        println!("{text}");
    }
}

/// Console that records everything it is given.
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: Mutex<Vec<String>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Console for BufferConsole {
    fn emit(&self, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
    }
}

struct SessionState {
    config: SessionConfig,
    fs: Arc<dyn Filesystem>,
    console: Arc<dyn Console>,
    current: RwLock<Data>,
    history: RwLock<Vec<Data>>,
    files: RwLock<Option<Data>>,
}

/// Shared handle to session state.
#[derive(Clone)]
pub struct Session {
    state: Arc<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.state.config.name)
            .field("history", &self.history_len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session whose filesystem follows `config.fs_mode`.
    pub fn new(config: SessionConfig, console: Arc<dyn Console>) -> Self {
        let fs: Arc<dyn Filesystem> = match config.fs_mode {
            FsMode::Local if config.read_only => Arc::new(LocalFs::read_only("/")),
            FsMode::Local => Arc::new(LocalFs::new("/")),
            FsMode::Memory => Arc::new(MemoryFs::new()),
        };
        Self::with_filesystem(config, fs, console)
    }

    /// Create a session over a caller-supplied filesystem.
    pub fn with_filesystem(
        config: SessionConfig,
        fs: Arc<dyn Filesystem>,
        console: Arc<dyn Console>,
    ) -> Self {
        tracing::debug!(name = %config.name, mode = ?config.fs_mode, "session created");
        Self {
            state: Arc::new(SessionState {
                config,
                fs,
                console,
                current: RwLock::new(Data::default()),
                history: RwLock::new(Vec::new()),
                files: RwLock::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.state.config
    }

    pub fn fs(&self) -> &Arc<dyn Filesystem> {
        &self.state.fs
    }

    pub fn console(&self) -> &Arc<dyn Console> {
        &self.state.console
    }

    /// The current value (`data` at the prompt).
    pub fn current(&self) -> Data {
        self.state
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_current(&self, data: Data) {
        *self
            .state
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = data;
    }

    /// Push the current value onto history and install `data` in its place.
    /// Returns the new current value.
    pub fn load(&self, data: Data) -> Data {
        let previous = std::mem::replace(
            &mut *self
                .state
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner),
            data.clone(),
        );
        self.state
            .history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(previous);
        data
    }

    /// Restore the most recent history entry as the current value.
    ///
    /// Returns `None` (and leaves the current value alone) when history is
    /// empty.
    pub fn back(&self) -> Option<Data> {
        let previous = self
            .state
            .history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()?;
        self.set_current(previous.clone());
        Some(previous)
    }

    pub fn history_len(&self) -> usize {
        self.state
            .history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Registered file paths, if any.
    pub fn files(&self) -> Option<Data> {
        self.state
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn register_files(&self, files: Data) {
        tracing::debug!(count = files.len(), "files registered");
        *self
            .state
            .files
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(files);
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.state.config.cwd.join(path)
        }
    }

    /// Render a value for display, truncated to `max_chars`.
    pub fn render(&self, data: &Data) -> String {
        truncate_chars(&inspect(data.items()), self.state.config.max_chars).to_string()
    }

    pub fn emit(&self, text: &str) {
        self.state.console.emit(text);
    }
}
