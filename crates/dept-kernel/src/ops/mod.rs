//! The operation registry.
//!
//! Every container operation is declared exactly once, in the
//! [`operations!`] table below. From that table the macro generates:
//!
//! - [`Op`], the reified call (name + bound arguments),
//! - [`Op::from_call`], binding prompt literals to typed parameters,
//! - [`OPERATIONS`], descriptors for help output,
//! - [`Pipeline`], the shared method surface of `Data`, `Deferred`,
//!   `Fanout` and `Container`.
//!
//! Each container type implements only [`Pipeline::apply`]; the provided
//! methods (`split`, `flatten`, `read`, ...) all funnel into it. Adding a row
//! to the table makes the operation available on every container type, lifted
//! the way that type lifts everything else:
//!
//! ```text
//!  Data::apply      run it now                  → Result<Container>
//!  Deferred::apply  wait for prior link, run it → Deferred (errors become rejection)
//!  Fanout::apply    run it on every branch      → Result<Fanout>
//! ```

mod args;
mod pattern;
mod transform;

pub use args::{ArgError, FromLiteral};
pub use pattern::Pattern;
pub(crate) use pattern::split_lines;
pub use transform::{Transform, TransformFn, BUILTIN_TRANSFORMS};

pub(crate) use args::ArgCursor;

use crate::ast::Literal;
use crate::session::Session;

/// Descriptor of one registered operation.
#[derive(Debug, Clone, Copy)]
pub struct OpSpec {
    /// Name typed at the prompt.
    pub name: &'static str,
    /// Parameter names in order.
    pub params: &'static [&'static str],
    /// One-line description.
    pub summary: &'static str,
}

impl OpSpec {
    /// `split(delimiter)` style signature.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.params.join(", "))
    }
}

/// Look up an operation descriptor by prompt name.
pub fn lookup(name: &str) -> Option<&'static OpSpec> {
    OPERATIONS.iter().find(|spec| spec.name == name)
}

macro_rules! bind_arg {
    ($cursor:ident, $arg:ident) => {
        $cursor.take(stringify!($arg))?
    };
    ($cursor:ident, $arg:ident, $default:expr) => {
        $cursor.take_or(stringify!($arg), $default)?
    };
}

macro_rules! operations {
    ($(
        #[doc = $doc:literal]
        $variant:ident => $name:literal, fn $method:ident($($arg:ident: $ty:ty $(= $default:expr)?),*);
    )*) => {
        /// A container operation with its arguments bound.
        #[derive(Debug, Clone)]
        pub enum Op {
            $(
                #[doc = $doc]
                $variant { $($arg: $ty),* },
            )*
        }

        impl Op {
            /// Name of the operation as typed at the prompt.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Op::$variant { .. } => $name,)*
                }
            }

            /// Build an operation from a prompt call.
            pub fn from_call(name: &str, args: Vec<Literal>) -> Result<Op, ArgError> {
                match name {
                    $(
                        $name => {
                            #[allow(unused_mut)]
                            let mut cursor = ArgCursor::new($name, args);
                            let op = Op::$variant { $($arg: bind_arg!(cursor, $arg $(, $default)?)),* };
                            cursor.finish()?;
                            Ok(op)
                        }
                    )*
                    other => Err(ArgError::UnknownOperation(other.to_string())),
                }
            }
        }

        /// Every registered operation, in declaration order.
        pub const OPERATIONS: &[OpSpec] = &[
            $(OpSpec { name: $name, params: &[$(stringify!($arg)),*], summary: $doc },)*
        ];

        /// The operation surface shared by every container type.
        pub trait Pipeline {
            /// What an operation on this container produces.
            type Output;

            /// Apply a reified operation.
            fn apply(&self, op: Op, session: &Session) -> Self::Output;

            $(
                #[doc = $doc]
                fn $method(&self, session: &Session $(, $arg: impl Into<$ty>)*) -> Self::Output {
                    self.apply(Op::$variant { $($arg: $arg.into()),* }, session)
                }
            )*
        }
    };
}

operations! {
    /// Same items in a new container.
    Copy => "copy", fn copy();
    /// Print the items to the console and pass them through.
    Print => "print", fn print();
    /// Push the current value onto history and make this the current value.
    Load => "load", fn load();
    /// Split each item's text by a delimiter into a list.
    Split => "split", fn split(delimiter: Pattern);
    /// Split each item's text into lines.
    Lines => "lines", fn lines();
    /// Split each item's text into characters.
    Chars => "chars", fn chars();
    /// Splice nested lists into the sequence; text expands to characters.
    Flatten => "flatten", fn flatten();
    /// Print each item's text, separated, and pass the items through.
    Show => "type", fn show();
    /// Fan out into one branch per item.
    Each => "each", fn each();
    /// Remove `count` items starting at `at` and return them.
    Splice => "splice", fn splice(at: i64, count: i64 = 1);
    /// The item at `index`, or undefined.
    At => "at", fn at(index: i64);
    /// Replace a pattern in each item's text.
    Replace => "replace", fn replace(pattern: Pattern, with: String);
    /// Parse the leading number of each item's text.
    Float => "float", fn float();
    /// Add a number to each item.
    Offset => "offset", fn offset(by: f64);
    /// Apply a transform to each item.
    Map => "map", fn map(f: Transform);
    /// Apply a transform to each item (same as map).
    Transform => "transform", fn transform(f: Transform);
    /// Join all items' text into a single item.
    Join => "join", fn join(delimiter: String);
    /// Write all items to one file, separated by U+001F.
    WriteFile => "write_file", fn write_file(path: String);
    /// Register these items as the session's file paths.
    Files => "files", fn files();
    /// Write item i to registered path i.
    Write => "write", fn write();
    /// Rename registered path i to item i.
    Rename => "rename", fn rename();
    /// Birth time of each path.
    Date => "date", fn date();
    /// Contents of each path.
    Read => "read", fn read();
    /// Delete each path.
    Delete => "delete", fn delete();
    /// Items in reverse order.
    Reverse => "reverse", fn reverse();
}
