//! Pure data types for dept: items, their text forms, and inspection.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. It exists
//! so the kernel and the REPL agree on what an item is and how it prints,
//! without the REPL reaching into kernel internals for formatting.

pub mod inspect;
pub mod item;

// Flat re-exports for convenience
pub use inspect::*;
pub use item::*;
