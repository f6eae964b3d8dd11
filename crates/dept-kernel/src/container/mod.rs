//! The three container tiers and their common sum type.
//!
//! ```text
//! ┌──────────┐   I/O op   ┌──────────────┐
//! │   Data   │──────────▶│   Deferred   │  Pending → Ready(Data) | Failed
//! │ (items)  │            └──────────────┘
//! │          │   each()   ┌──────────────┐   end()   ┌──────────────────┐
//! │          │──────────▶│    Fanout    │─────────▶│ Data or Deferred │
//! └──────────┘            │  (branches)  │           └──────────────────┘
//!                         └──────────────┘
//! ```
//!
//! All three share one operation surface through [`Pipeline`].

mod data;
mod deferred;
mod fanout;
mod io;

pub use data::Data;
pub use deferred::{Deferred, State};
pub use fanout::{Branch, Fanout, Origin};
pub use io::{read_dir, read_file, read_registered, UNIT_SEPARATOR};

use crate::error::PipelineResult;
use crate::ops::{Op, Pipeline};
use crate::session::Session;

/// Any of the three container kinds.
#[derive(Debug, Clone)]
pub enum Container {
    Value(Data),
    Deferred(Deferred),
    Fanout(Fanout),
}

impl Container {
    /// Short name of the kind, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Container::Value(_) => "value container",
            Container::Deferred(_) => "deferred container",
            Container::Fanout(_) => "fan-out container",
        }
    }

    pub fn as_value(&self) -> Option<&Data> {
        match self {
            Container::Value(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&Deferred> {
        match self {
            Container::Deferred(deferred) => Some(deferred),
            _ => None,
        }
    }

    pub fn as_fanout(&self) -> Option<&Fanout> {
        match self {
            Container::Fanout(fanout) => Some(fanout),
            _ => None,
        }
    }
}

impl Pipeline for Container {
    type Output = PipelineResult<Container>;

    fn apply(&self, op: Op, session: &Session) -> Self::Output {
        match self {
            Container::Value(data) => data.apply(op, session),
            Container::Deferred(deferred) => Ok(Container::Deferred(deferred.apply(op, session))),
            Container::Fanout(fanout) => fanout.apply(op, session).map(Container::Fanout),
        }
    }
}

impl From<Data> for Container {
    fn from(data: Data) -> Self {
        Container::Value(data)
    }
}

impl From<Deferred> for Container {
    fn from(deferred: Deferred) -> Self {
        Container::Deferred(deferred)
    }
}

impl From<Fanout> for Container {
    fn from(fanout: Fanout) -> Self {
        Container::Fanout(fanout)
    }
}
