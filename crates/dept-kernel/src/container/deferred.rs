//! `Deferred`: a value container that is still being computed.
//!
//! The computation runs on the tokio runtime from the moment it is created.
//! Its outcome is published once through a watch channel; every clone of the
//! handle observes the same settled [`State`]. Dropping the handle does not
//! cancel the computation.

use std::fmt;
use std::future::Future;

use tokio::sync::watch;

use super::{Container, Data};
use crate::error::{PipelineError, PipelineResult};
use crate::ops::{Op, Pipeline};
use crate::session::Session;

/// Settlement state of a deferred container.
#[derive(Debug, Clone)]
pub enum State {
    Pending,
    Ready(Data),
    Failed(PipelineError),
}

impl State {
    pub fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }

    fn settled(&self) -> Option<PipelineResult<Data>> {
        match self {
            State::Pending => None,
            State::Ready(data) => Some(Ok(data.clone())),
            State::Failed(err) => Some(Err(err.clone())),
        }
    }
}

/// Handle to a pending computation that yields a [`Data`].
#[derive(Clone)]
pub struct Deferred {
    rx: watch::Receiver<State>,
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Deferred").field(&*self.rx.borrow()).finish()
    }
}

impl Deferred {
    /// Start `computation` on the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    pub fn spawn<F>(computation: F) -> Self
    where
        F: Future<Output = PipelineResult<Container>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(State::Pending);
        tokio::spawn(async move {
            let state = settle(computation).await;
            tracing::debug!(failed = matches!(state, State::Failed(_)), "deferred settled");
            tx.send_replace(state);
        });
        Self { rx }
    }

    /// An already-resolved handle.
    pub fn ready(data: Data) -> Self {
        Self::settled_with(State::Ready(data))
    }

    /// An already-rejected handle.
    pub fn failed(err: PipelineError) -> Self {
        Self::settled_with(State::Failed(err))
    }

    fn settled_with(state: State) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self { rx }
    }

    /// Current state, without waiting.
    pub fn state(&self) -> State {
        self.rx.borrow().clone()
    }

    /// Wait for the computation to settle.
    pub async fn resolve(&self) -> PipelineResult<Data> {
        let mut rx = self.rx.clone();
        loop {
            let settled = rx.borrow_and_update().settled();
            if let Some(result) = settled {
                return result;
            }
            if rx.changed().await.is_err() {
                // Sender gone: either it published just before dropping, or
                // the task died.
                let settled = rx.borrow().settled();
                return settled.unwrap_or_else(|| {
                    Err(PipelineError::TaskFailed(
                        "computation ended without settling".to_string(),
                    ))
                });
            }
        }
    }
}

/// Drive a computation to a terminal state, flattening nested deferred
/// results.
async fn settle<F>(computation: F) -> State
where
    F: Future<Output = PipelineResult<Container>>,
{
    let outcome = match computation.await {
        Ok(Container::Value(data)) => Ok(data),
        Ok(Container::Deferred(inner)) => inner.resolve().await,
        Ok(other) => Err(PipelineError::ProtocolViolation {
            found: other.kind(),
        }),
        Err(err) => Err(err),
    };
    match outcome {
        Ok(data) => State::Ready(data),
        Err(err) => State::Failed(err),
    }
}

impl Pipeline for Deferred {
    type Output = Deferred;

    fn apply(&self, op: Op, session: &Session) -> Self::Output {
        let prior = self.clone();
        let session = session.clone();
        Deferred::spawn(async move {
            let data = prior.resolve().await?;
            data.apply(op, &session)
        })
    }
}
