//! I/O-backed operations. Each returns a [`Deferred`].
//!
//! Items are treated as paths (or, for `write`, as contents paired with the
//! registered paths). Per-item calls run concurrently and the first failure
//! rejects the whole operation. Errors name the path as the user typed it.

use chrono::{DateTime, Utc};
use dept_types::Item;
use futures::future::try_join_all;
use std::io;

use super::{Container, Data, Deferred};
use crate::error::{PipelineError, PipelineResult};
use crate::ops::Op;
use crate::session::Session;

/// Separator between items in a file written by `write_file`.
pub const UNIT_SEPARATOR: char = '\u{1f}';

/// Registered paths, checked against the item count before any I/O starts.
fn registered_paths(data: &Data, session: &Session) -> PipelineResult<Vec<String>> {
    let files = session.files().ok_or(PipelineError::NoFilesRegistered)?;
    if files.len() != data.len() {
        return Err(PipelineError::CardinalityMismatch {
            registered: files.len(),
            items: data.len(),
        });
    }
    Ok(files.texts())
}

/// Synchronous preconditions of `op`, checked before any I/O starts.
pub(super) fn precheck(op: &Op, data: &Data, session: &Session) -> PipelineResult<()> {
    let mutates = matches!(
        op,
        Op::WriteFile { .. } | Op::Write {} | Op::Rename {} | Op::Delete {}
    );
    if mutates && session.fs().read_only() {
        return Err(PipelineError::ReadOnly);
    }
    match op {
        Op::Write {} | Op::Rename {} => registered_paths(data, session).map(drop),
        _ => Ok(()),
    }
}

pub(super) fn write_file(data: &Data, session: &Session, path: String) -> Deferred {
    let contents = data.texts().join(&UNIT_SEPARATOR.to_string());
    let data = data.clone();
    let session = session.clone();
    Deferred::spawn(async move {
        session
            .fs()
            .write(&session.resolve_path(&path), contents.as_bytes())
            .await
            .map_err(|e| PipelineError::io(path.as_str(), e))?;
        session.emit(&format!("File {path} written"));
        Ok(Container::Value(data))
    })
}

pub(super) fn write(data: &Data, session: &Session) -> PipelineResult<Deferred> {
    let paths = registered_paths(data, session)?;
    let data = data.clone();
    let session = session.clone();
    Ok(Deferred::spawn(async move {
        let writes = paths.iter().zip(data.items()).map(|(path, item)| {
            let session = &session;
            async move {
                session
                    .fs()
                    .write(&session.resolve_path(path), &item.to_bytes())
                    .await
                    .map_err(|e| PipelineError::io(path.as_str(), e))?;
                session.emit(&format!("File {path} written"));
                Ok::<_, PipelineError>(())
            }
        });
        try_join_all(writes).await?;
        Ok(Container::Value(data))
    }))
}

pub(super) fn rename(data: &Data, session: &Session) -> PipelineResult<Deferred> {
    let paths = registered_paths(data, session)?;
    let data = data.clone();
    let session = session.clone();
    Ok(Deferred::spawn(async move {
        let targets = data.texts();
        let renames = paths.iter().zip(&targets).map(|(from, to)| {
            let session = &session;
            async move {
                session
                    .fs()
                    .rename(&session.resolve_path(from), &session.resolve_path(to))
                    .await
                    .map_err(|e| PipelineError::io(from.as_str(), e))?;
                session.emit(&format!("File {from} renamed"));
                Ok::<_, PipelineError>(())
            }
        });
        try_join_all(renames).await?;
        Ok(Container::Value(data))
    }))
}

pub(super) fn date(data: &Data, session: &Session) -> Deferred {
    let paths = data.texts();
    let session = session.clone();
    Deferred::spawn(async move {
        let stats = paths.iter().map(|path| {
            let session = &session;
            async move {
                let meta = session
                    .fs()
                    .stat(&session.resolve_path(path))
                    .await
                    .map_err(|e| PipelineError::io(path.as_str(), e))?;
                let time = meta.created.or(meta.modified).ok_or_else(|| {
                    PipelineError::io(
                        path.as_str(),
                        io::Error::new(io::ErrorKind::Unsupported, "no birth time recorded"),
                    )
                })?;
                Ok::<_, PipelineError>(Item::Time(DateTime::<Utc>::from(time)))
            }
        });
        Ok(Container::Value(Data::new(try_join_all(stats).await?)))
    })
}

pub(super) fn read(data: &Data, session: &Session) -> Deferred {
    let paths = data.texts();
    let session = session.clone();
    Deferred::spawn(async move {
        let reads = paths.iter().map(|path| {
            let session = &session;
            async move {
                let contents = session
                    .fs()
                    .read(&session.resolve_path(path))
                    .await
                    .map_err(|e| PipelineError::io(path.as_str(), e))?;
                session.emit(&format!("File {path} read"));
                Ok::<_, PipelineError>(Item::from_contents(contents))
            }
        });
        Ok(Container::Value(Data::new(try_join_all(reads).await?)))
    })
}

pub(super) fn delete(data: &Data, session: &Session) -> Deferred {
    let data = data.clone();
    let session = session.clone();
    Deferred::spawn(async move {
        let paths = data.texts();
        let removals = paths.iter().map(|path| {
            let session = &session;
            async move {
                session
                    .fs()
                    .remove(&session.resolve_path(path))
                    .await
                    .map_err(|e| PipelineError::io(path.as_str(), e))
            }
        });
        try_join_all(removals).await?;
        Ok(Container::Value(data))
    })
}

/// Read a file written by `write_file`, one item per separated field.
pub fn read_file(session: &Session, path: impl Into<String>) -> Deferred {
    let path = path.into();
    let session = session.clone();
    Deferred::spawn(async move {
        let contents = session
            .fs()
            .read(&session.resolve_path(&path))
            .await
            .map_err(|e| PipelineError::io(path.as_str(), e))?;
        let text = String::from_utf8_lossy(&contents);
        Ok(Container::Value(text.split(UNIT_SEPARATOR).map(Item::from).collect()))
    })
}

/// Entry names of a directory.
pub fn read_dir(session: &Session, path: impl Into<String>) -> Deferred {
    let path = path.into();
    let session = session.clone();
    Deferred::spawn(async move {
        let names = session
            .fs()
            .list(&session.resolve_path(&path))
            .await
            .map_err(|e| PipelineError::io(path.as_str(), e))?;
        Ok(Container::Value(Data::from(names)))
    })
}

/// Contents of every registered file.
pub fn read_registered(session: &Session) -> PipelineResult<Deferred> {
    let files = session.files().ok_or(PipelineError::NoFilesRegistered)?;
    Ok(read(&files, session))
}
