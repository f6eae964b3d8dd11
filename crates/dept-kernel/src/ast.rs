//! AST for the prompt's expression language.
//!
//! An input line is a head (a global function, variable, or literal)
//! followed by a chain of method calls:
//!
//! ```text
//! data.each().read().lines().end()
//! └──┘└──────── method chain ─────┘
//! head
//! ```

use std::fmt;

use dept_types::Item;

/// A literal argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    /// `/.../` regex literal, source text without the slashes.
    Regex(String),
    Num(f64),
    /// Bare identifier used as an argument (named transforms).
    Ident(String),
    List(Vec<Literal>),
}

impl Literal {
    /// Convert to an item for `V(...)` and bare literals.
    pub fn to_item(&self) -> Item {
        match self {
            Literal::Str(s) | Literal::Regex(s) | Literal::Ident(s) => Item::Text(s.clone()),
            Literal::Num(n) => Item::Number(*n),
            Literal::List(items) => Item::List(items.iter().map(Literal::to_item).collect()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Str(_) => "string",
            Literal::Regex(_) => "regex",
            Literal::Num(_) => "number",
            Literal::Ident(_) => "identifier",
            Literal::List(_) => "list",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "{s:?}"),
            Literal::Regex(s) => write!(f, "/{s}/"),
            Literal::Num(n) => write!(f, "{}", dept_types::format_number(*n)),
            Literal::Ident(s) => write!(f, "{s}"),
            Literal::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A named call. `args` is `None` when written without parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Option<Vec<Literal>>,
}

/// Start of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Head {
    /// `data`, `V(1, 2)`, `readdir()`...
    Call(Call),
    Literal(Literal),
}

/// A full input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub head: Head,
    /// Method calls applied left to right. Always have parentheses.
    pub chain: Vec<Call>,
}
