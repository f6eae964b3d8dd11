//! Binding prompt literals to typed operation parameters.

use thiserror::Error;

use dept_types::format_number;

use super::pattern::Pattern;
use super::transform::{Transform, BUILTIN_TRANSFORMS};
use crate::ast::Literal;

/// Errors binding a call's arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{op}: missing argument `{param}`")]
    Missing {
        op: &'static str,
        param: &'static str,
    },

    #[error("{op}: unexpected argument {arg}")]
    Unexpected { op: &'static str, arg: String },

    #[error("{op}: invalid `{param}`: {reason}")]
    Invalid {
        op: &'static str,
        param: &'static str,
        reason: String,
    },
}

/// A parameter type that can be built from a prompt literal.
pub trait FromLiteral: Sized {
    fn from_literal(literal: Literal) -> Result<Self, String>;
}

impl FromLiteral for String {
    fn from_literal(literal: Literal) -> Result<Self, String> {
        match literal {
            Literal::Str(s) => Ok(s),
            Literal::Num(n) => Ok(format_number(n)),
            other => Err(format!("expected text, got {}", other.kind())),
        }
    }
}

impl FromLiteral for f64 {
    fn from_literal(literal: Literal) -> Result<Self, String> {
        match literal {
            Literal::Num(n) => Ok(n),
            Literal::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("expected a number, got {s:?}")),
            other => Err(format!("expected a number, got {}", other.kind())),
        }
    }
}

impl FromLiteral for i64 {
    fn from_literal(literal: Literal) -> Result<Self, String> {
        match literal {
            Literal::Num(n) if n.fract() == 0.0 && n.is_finite() => Ok(n as i64),
            Literal::Num(n) => Err(format!("expected an integer, got {}", format_number(n))),
            other => Err(format!("expected an integer, got {}", other.kind())),
        }
    }
}

impl FromLiteral for Pattern {
    fn from_literal(literal: Literal) -> Result<Self, String> {
        match literal {
            Literal::Str(s) => Ok(Pattern::Literal(s)),
            Literal::Regex(src) => Pattern::regex(&src).map_err(|e| e.to_string()),
            other => Err(format!("expected a string or /regex/, got {}", other.kind())),
        }
    }
}

impl FromLiteral for Transform {
    fn from_literal(literal: Literal) -> Result<Self, String> {
        match literal {
            Literal::Ident(name) | Literal::Str(name) => {
                Transform::builtin(&name).ok_or_else(|| {
                    format!(
                        "unknown transform `{name}` (available: {})",
                        BUILTIN_TRANSFORMS.join(", ")
                    )
                })
            }
            other => Err(format!("expected a transform name, got {}", other.kind())),
        }
    }
}

/// Walks a call's literals in parameter order.
pub(crate) struct ArgCursor {
    op: &'static str,
    args: std::vec::IntoIter<Literal>,
}

impl ArgCursor {
    pub(crate) fn new(op: &'static str, args: Vec<Literal>) -> Self {
        Self {
            op,
            args: args.into_iter(),
        }
    }

    /// Bind the next required parameter.
    pub(crate) fn take<T: FromLiteral>(&mut self, param: &'static str) -> Result<T, ArgError> {
        match self.args.next() {
            Some(literal) => self.bind(param, literal),
            None => Err(ArgError::Missing { op: self.op, param }),
        }
    }

    /// Bind the next parameter, using `default` when the call stops early.
    pub(crate) fn take_or<T: FromLiteral>(
        &mut self,
        param: &'static str,
        default: T,
    ) -> Result<T, ArgError> {
        match self.args.next() {
            Some(literal) => self.bind(param, literal),
            None => Ok(default),
        }
    }

    /// Fail if any arguments were left over.
    pub(crate) fn finish(mut self) -> Result<(), ArgError> {
        match self.args.next() {
            Some(extra) => Err(ArgError::Unexpected {
                op: self.op,
                arg: extra.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn bind<T: FromLiteral>(&self, param: &'static str, literal: Literal) -> Result<T, ArgError> {
        T::from_literal(literal).map_err(|reason| ArgError::Invalid {
            op: self.op,
            param,
            reason,
        })
    }
}
