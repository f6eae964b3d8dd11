//! Output formatting for the REPL.
//!
//! Everything shown at the prompt goes through here: immediate outcomes,
//! settled deferred results, errors and the `/ops` table.

use std::fmt::Display;

use dept_kernel::{Branch, Container, Data, Outcome, PipelineResult, Session, State, OPERATIONS};
use dept_types::{inspect_item, truncate_chars};

/// Shown in place of a value that is still being computed.
pub const WAITING: &str = "Waiting...";

/// Format the immediate result of evaluating a line. `None` means print
/// nothing.
pub fn format_outcome(session: &Session, outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Nothing => None,
        Outcome::Value(item) => {
            let text = inspect_item(item);
            Some(truncate_chars(&text, session.config().max_chars).to_string())
        }
        Outcome::Container(container) => Some(format_container(session, container)),
    }
}

fn format_container(session: &Session, container: &Container) -> String {
    match container {
        Container::Value(data) => session.render(data),
        Container::Deferred(_) => WAITING.to_string(),
        Container::Fanout(fanout) => fanout
            .branches()
            .map(|branch| format_branch(session, branch))
            .collect::<Vec<_>>()
            .join(&session.config().separator),
    }
}

fn format_branch(session: &Session, branch: &Branch) -> String {
    match branch {
        Branch::Value(data) => session.render(data),
        Branch::Deferred(deferred) => match deferred.state() {
            State::Pending => WAITING.to_string(),
            State::Ready(data) => session.render(&data),
            State::Failed(err) => format_error(&err),
        },
    }
}

/// Format what a deferred container settled to.
pub fn format_settled(session: &Session, result: &PipelineResult<Data>) -> String {
    match result {
        Ok(data) => session.render(data),
        Err(err) => format_error(err),
    }
}

pub fn format_error(err: &dyn Display) -> String {
    format!("Error: {err}")
}

/// The `/ops` listing: one operation per line, signature then summary.
pub fn format_ops() -> String {
    let width = OPERATIONS
        .iter()
        .map(|spec| spec.signature().len())
        .max()
        .unwrap_or(0);
    OPERATIONS
        .iter()
        .map(|spec| format!("  {:<width$}  {}", spec.signature(), spec.summary.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
