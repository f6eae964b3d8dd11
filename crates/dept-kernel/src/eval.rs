//! Evaluating a prompt line against a session.
//!
//! The head of an expression is a global (`data`, `files`, `V(...)`,
//! `back()`, `readfile(path)`, `readdir(path)`, `read()`) or a literal; each
//! method in the chain is either `end()` or a registered operation applied
//! through [`Pipeline::apply`].
//!
//! Any operation that returns a deferred container needs a tokio runtime
//! context.

use dept_types::Item;
use logos::Span;
use thiserror::Error;

use crate::ast::{Call, Expr, Head, Literal};
use crate::container::{read_dir, read_file, read_registered, Container, Data};
use crate::error::PipelineError;
use crate::lexer::{tokenize, LexError};
use crate::ops::{ArgCursor, ArgError, Op, Pipeline};
use crate::parser::{parse, ParseError};
use crate::session::Session;

/// What a line evaluated to.
#[derive(Debug, Clone)]
pub enum Outcome {
    Container(Container),
    /// A bare literal.
    Value(Item),
    /// Nothing to show (blank line, `files` with none registered).
    Nothing,
}

/// Evaluation errors.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error("{error} at offset {}", span.start)]
    Lex { error: LexError, span: Span },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error(transparent)]
    Argument(#[from] ArgError),

    #[error("end() needs a fan-out container, got a {0}")]
    NotFanout(&'static str),

    #[error("history is empty")]
    EmptyHistory,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Evaluate one line.
pub fn evaluate(session: &Session, source: &str) -> Result<Outcome, EvalError> {
    let tokens = tokenize(source).map_err(|errors| match errors.into_iter().next() {
        Some(first) => EvalError::Lex {
            error: first.token,
            span: first.span,
        },
        None => EvalError::Lex {
            error: LexError::default(),
            span: 0..source.len(),
        },
    })?;
    if tokens.is_empty() {
        return Ok(Outcome::Nothing);
    }

    let Expr { head, chain } = parse(&tokens)?;
    tracing::debug!(methods = chain.len(), "evaluating");

    let mut current = match eval_head(session, head)? {
        Start::Container(container) => container,
        Start::Item(item) if chain.is_empty() => return Ok(Outcome::Value(item)),
        Start::Item(Item::List(items)) => Container::Value(Data::new(items)),
        Start::Item(item) => Container::Value(Data::new(vec![item])),
        Start::Nothing if chain.is_empty() => return Ok(Outcome::Nothing),
        Start::Nothing => return Err(PipelineError::NoFilesRegistered.into()),
    };

    for call in chain {
        current = eval_method(session, current, call)?;
    }

    Ok(Outcome::Container(current))
}

enum Start {
    Container(Container),
    Item(Item),
    Nothing,
}

fn eval_head(session: &Session, head: Head) -> Result<Start, EvalError> {
    let Call { name, args } = match head {
        Head::Literal(literal) => return Ok(Start::Item(literal.to_item())),
        Head::Call(call) => call,
    };
    let args = args.unwrap_or_default();

    let start = match name.as_str() {
        "data" => {
            ArgCursor::new("data", args).finish()?;
            Start::Container(session.current().into())
        }
        "files" => {
            ArgCursor::new("files", args).finish()?;
            session
                .files()
                .map_or(Start::Nothing, |files| Start::Container(files.into()))
        }
        "V" => Start::Container(args.iter().map(Literal::to_item).collect::<Data>().into()),
        "back" => {
            ArgCursor::new("back", args).finish()?;
            let previous = session.back().ok_or(EvalError::EmptyHistory)?;
            Start::Container(previous.into())
        }
        "readfile" => {
            let mut cursor = ArgCursor::new("readfile", args);
            let path: String = cursor.take("path")?;
            cursor.finish()?;
            Start::Container(read_file(session, path).into())
        }
        "readdir" => {
            let mut cursor = ArgCursor::new("readdir", args);
            let path: String = cursor.take_or("path", ".".to_string())?;
            cursor.finish()?;
            Start::Container(read_dir(session, path).into())
        }
        "read" => {
            ArgCursor::new("read", args).finish()?;
            Start::Container(read_registered(session)?.into())
        }
        _ => return Err(EvalError::UnknownFunction(name)),
    };
    Ok(start)
}

fn eval_method(session: &Session, current: Container, call: Call) -> Result<Container, EvalError> {
    let args = call.args.unwrap_or_default();
    if call.name == "end" {
        ArgCursor::new("end", args).finish()?;
        return match current {
            Container::Fanout(fanout) => Ok(fanout.end()),
            other => Err(EvalError::NotFanout(other.kind())),
        };
    }
    let op = Op::from_call(&call.name, args)?;
    Ok(current.apply(op, session)?)
}
