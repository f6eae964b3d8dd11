//! dept REPL: interactive pipeline prompt.
//!
//! This REPL evaluates one expression per line against a session.
//! It handles:
//! - Meta-commands: `/help`, `/quit`, `/ops`, `/history`
//! - Immediate rendering of value and fan-out results
//! - Background printing of deferred results once they settle
//! - Command history via rustyline

pub mod format;

use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Editor, ExternalPrinter};
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use dept_kernel::{evaluate, Console, Container, Outcome, Session, SessionConfig, StdoutConsole};

/// Returned from [`Repl::process_line`] when the user asked to leave.
#[derive(Debug, Error)]
#[error("exit requested")]
pub struct ExitRequested;

/// Result from meta-command handling.
#[derive(Debug)]
enum MetaResult {
    /// Continue with optional output
    Continue(Option<String>),
    /// Exit the REPL (caller should save history and exit)
    Exit,
}

/// REPL state: the session and the runtime deferred work runs on.
pub struct Repl {
    session: Session,
    runtime: Runtime,
    pending: Vec<JoinHandle<()>>,
}

impl Repl {
    /// Create a REPL from the user's config file, printing to stdout.
    pub fn new() -> Result<Self> {
        let config = SessionConfig::load()?;
        Self::with_config(config)
    }

    pub fn with_config(config: SessionConfig) -> Result<Self> {
        Self::with_console(config, Arc::new(StdoutConsole))
    }

    /// Create a REPL whose asynchronous output goes to `console`.
    pub fn with_console(config: SessionConfig, console: Arc<dyn Console>) -> Result<Self> {
        // One worker: a single logical thread of async control.
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        Ok(Self {
            session: Session::new(config, console),
            runtime,
            pending: Vec::new(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Process a single line of input.
    ///
    /// Returns `Ok(None)` when there is nothing to show and `Ok(Some(text))`
    /// for immediate output. Evaluation errors are rendered as output;
    /// the only error is [`ExitRequested`].
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();

        if trimmed.starts_with('/') {
            return match self.handle_meta_command(trimmed) {
                MetaResult::Continue(output) => Ok(output),
                MetaResult::Exit => Err(ExitRequested.into()),
            };
        }

        if matches!(trimmed, "quit" | "exit") {
            return Err(ExitRequested.into());
        }
        if trimmed == "help" {
            return Ok(Some(HELP_TEXT.to_string()));
        }

        if trimmed.is_empty() {
            return Ok(None);
        }

        // Deferred containers spawn onto the runtime during evaluation.
        let outcome = {
            let _guard = self.runtime.enter();
            evaluate(&self.session, trimmed)
        };

        match outcome {
            Ok(outcome) => {
                if let Outcome::Container(Container::Deferred(deferred)) = &outcome {
                    let deferred = deferred.clone();
                    let session = self.session.clone();
                    self.pending.retain(|handle| !handle.is_finished());
                    self.pending.push(self.runtime.spawn(async move {
                        let settled = deferred.resolve().await;
                        session.emit(&format::format_settled(&session, &settled));
                    }));
                }
                Ok(format::format_outcome(&self.session, &outcome))
            }
            Err(e) => Ok(Some(format::format_error(&e))),
        }
    }

    /// Process a script: every non-empty line not starting with `#`, in
    /// order. Stops early on an exit request.
    pub fn process_script(&mut self, source: &str) -> Vec<String> {
        let mut outputs = Vec::new();
        for line in source.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match self.process_line(trimmed) {
                Ok(Some(output)) => outputs.push(output),
                Ok(None) => {}
                Err(_) => break,
            }
        }
        outputs
    }

    /// Wait for every outstanding deferred print to finish.
    pub fn wait_pending(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = self.runtime.block_on(handle) {
                tracing::warn!("Deferred print task failed: {}", e);
            }
        }
    }

    /// Handle a meta-command (starts with /).
    fn handle_meta_command(&mut self, cmd: &str) -> MetaResult {
        let command = cmd.split_whitespace().next().unwrap_or("");

        match command {
            "/quit" | "/q" | "/exit" => MetaResult::Exit,
            "/help" | "/h" | "/?" => MetaResult::Continue(Some(HELP_TEXT.to_string())),
            "/ops" => MetaResult::Continue(Some(format::format_ops())),
            "/history" => MetaResult::Continue(Some(format!(
                "History depth: {}\nCurrent: {}",
                self.session.history_len(),
                self.session.render(&self.session.current())
            ))),
            _ => MetaResult::Continue(Some(format!(
                "Unknown command: {}\nType /help for available commands.",
                command
            ))),
        }
    }
}

const HELP_TEXT: &str = r#"dept: data extraction and processing tool

Meta Commands:
  help, /help, /?   Show this help
  quit, /quit, /q   Exit the REPL
  /ops              List every operation
  /history          Show history depth and the current value

Globals:
  data              The current value
  files             Registered file paths
  V(a, b, ...)      Build a value from literals
  back()            Restore the previous value
  readfile(path)    Read a file written by write_file
  readdir([path])   List a directory
  read()            Read every registered file

Chaining:
  x.op(args)        Apply an operation; see /ops
  x.each()          Fan out: one branch per item
  x.end()           Join a fan-out back into one value
  x.load()          Make x the current value

Literals:
  "text\n"  'raw'  /regex/  12  -1.5  [1, 'a']

Examples:
  readdir('logs').load()             # then, once it prints:
  data.each().read().lines().end()
  V('a,b', 'c,d').split(',').flatten()
  data.files()                       # register paths
  V('one', 'two').write()            # write item i to path i
"#;

/// Console that hands text to rustyline's external printer, so asynchronous
/// output does not tear the prompt.
struct PrinterConsole {
    tx: Mutex<mpsc::Sender<String>>,
}

impl Console for PrinterConsole {
    fn emit(&self, text: &str) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if tx.send(text.to_string()).is_err() {
            println!("{text}");
        }
    }
}

fn printer_console(printer: impl ExternalPrinter + Send + 'static) -> Arc<dyn Console> {
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        let mut printer = printer;
        for text in rx {
            if let Err(e) = printer.print(text) {
                tracing::warn!("External printer failed: {}", e);
            }
        }
    });
    Arc::new(PrinterConsole { tx: Mutex::new(tx) })
}

/// Save REPL history to disk.
fn save_history(rl: &mut Editor<(), DefaultHistory>, config: &SessionConfig) {
    let path = config.history_path();
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Failed to create history directory: {}", e);
        }
    }
    if let Err(e) = rl.save_history(&path) {
        tracing::warn!("Failed to save history: {}", e);
    }
}

/// Run the REPL.
pub fn run() -> Result<()> {
    println!("dept v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.");

    let config = SessionConfig::load()?;
    let mut rl: Editor<(), DefaultHistory> =
        Editor::new().context("Failed to create editor")?;

    if let Err(e) = rl.load_history(&config.history_path()) {
        // Only log if it's not a "file not found" error (expected on first run)
        let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
        if !is_not_found {
            tracing::warn!("Failed to load history: {}", e);
        }
    }

    let console: Arc<dyn Console> = match rl.create_external_printer() {
        Ok(printer) => printer_console(printer),
        Err(e) => {
            tracing::warn!("No external printer, falling back to stdout: {}", e);
            Arc::new(StdoutConsole)
        }
    };

    let mut repl = Repl::with_console(config.clone(), console)?;
    println!();

    loop {
        match rl.readline("dept> ") {
            Ok(line) => {
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    tracing::warn!("Failed to add history entry: {}", e);
                }

                match repl.process_line(&line) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) if e.is::<ExitRequested>() => break,
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    save_history(&mut rl, &config);
    repl.wait_pending();

    Ok(())
}
