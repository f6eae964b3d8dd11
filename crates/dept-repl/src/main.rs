//! dept CLI entry point.
//!
//! Usage:
//!   dept                       # Interactive REPL
//!   dept -c <expression>       # Evaluate one line and exit
//!   dept script.dept           # Run a script, one expression per line

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dept_kernel::SessionConfig;
use dept_repl::{ExitRequested, Repl};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None => {
            dept_repl::run()?;
            Ok(ExitCode::SUCCESS)
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!(
                "dept {} ({} {}, {})",
                env!("CARGO_PKG_VERSION"),
                env!("DEPT_GIT_HASH"),
                env!("DEPT_BUILD_DATE"),
                env!("DEPT_BUILD_TARGET"),
            );
            Ok(ExitCode::SUCCESS)
        }

        Some("-c") => {
            let expr = args
                .get(2)
                .context("-c requires an expression argument")?;
            run_command(expr)
        }

        Some(path) if !path.starts_with('-') => run_script(path),

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'dept --help' for usage.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!(
        r#"dept v{}

Usage:
  dept                         Interactive REPL
  dept -c <expression>         Evaluate one expression and exit
  dept <script>                Run a script file

Options:
  -c <expression>              Evaluate an expression and exit
  -h, --help                   Show this help
  -V, --version                Show version

Examples:
  dept -c "readdir('logs').reverse()"
  dept cleanup.dept
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Run a script file.
fn run_script(path: &str) -> Result<ExitCode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {path}"))?;

    let mut repl = Repl::with_config(SessionConfig::load()?)?;
    for output in repl.process_script(&source) {
        println!("{output}");
    }
    repl.wait_pending();

    Ok(ExitCode::SUCCESS)
}

/// Evaluate one expression and exit once its deferred output has printed.
fn run_command(expr: &str) -> Result<ExitCode> {
    let mut repl = Repl::with_config(SessionConfig::load()?)?;
    match repl.process_line(expr) {
        Ok(Some(output)) => println!("{output}"),
        Ok(None) => {}
        Err(e) if e.is::<ExitRequested>() => {}
        Err(e) => return Err(e),
    }
    repl.wait_pending();

    Ok(ExitCode::SUCCESS)
}
