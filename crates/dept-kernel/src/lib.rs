//! dept-kernel: the core of dept.
//!
//! This crate provides:
//!
//! - **Containers**: `Data` (synchronous), `Deferred` (pending) and `Fanout`
//!   (many branches), all sharing one operation surface
//! - **Operations**: the registry that declares every operation once and
//!   lifts it across the three container kinds
//! - **Session**: current value, history, registered files, console
//! - **VFS**: the filesystem collaborator behind I/O operations
//! - **Lexer / Parser / Eval**: the expression language typed at the prompt
//! - **Config / Paths**: `config.toml` and XDG locations

pub mod ast;
pub mod config;
pub mod container;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod paths;
pub mod session;
pub mod vfs;

pub use config::{FsMode, SessionConfig};
pub use container::{Branch, Container, Data, Deferred, Fanout, Origin, State};
pub use error::{PipelineError, PipelineResult};
pub use eval::{evaluate, EvalError, Outcome};
pub use ops::{lookup, Op, OpSpec, Pipeline, Transform, OPERATIONS};
pub use session::{BufferConsole, Console, Session, StdoutConsole};

pub use dept_types::{inspect, Item};
