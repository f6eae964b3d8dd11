//! Errors raised by container operations.
//!
//! Every variant is `Clone` because a settled deferred container hands the
//! same rejection to each observer.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Result type for container operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Container operation errors.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// A deferred computation settled to something other than a value
    /// container (or a nested deferred one).
    #[error("protocol violation: deferred computation settled to a {found}, expected a value container")]
    ProtocolViolation { found: &'static str },

    /// The registered path count does not match the container's item count.
    #[error("incorrect number of files registered ({registered} != {items})")]
    CardinalityMismatch { registered: usize, items: usize },

    /// `write`/`rename` was called before any paths were registered.
    #[error("no file names registered")]
    NoFilesRegistered,

    /// A mutating operation was attempted on a read-only filesystem.
    #[error("filesystem is read-only")]
    ReadOnly,

    /// A filesystem call failed.
    #[error("{}: {source}", path.display())]
    ExternalIo {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// A user-supplied transform rejected an item.
    #[error("{op}: {message}")]
    UserOperation { op: &'static str, message: String },

    /// The task driving a deferred computation ended without settling it.
    #[error("deferred computation failed: {0}")]
    TaskFailed(String),
}

impl PipelineError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::ExternalIo {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub fn user(op: &'static str, message: impl Into<String>) -> Self {
        PipelineError::UserOperation {
            op,
            message: message.into(),
        }
    }
}
