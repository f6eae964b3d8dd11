//! Filesystem collaborator for dept.
//!
//! The core never touches `std::fs` directly. Every I/O-backed operation goes
//! through a [`Filesystem`] held by the session:
//!
//! - **LocalFs**: Real filesystem access, rooted and escape-checked
//! - **MemoryFs**: In-memory ephemeral storage (tests, `fs_mode = "memory"`)

mod local;
mod memory;
mod traits;

pub use local::LocalFs;
pub use memory::MemoryFs;
pub use traits::{Filesystem, Metadata};
