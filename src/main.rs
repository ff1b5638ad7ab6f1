//! Run Lisp programs.
//!
//! Each file named on the command line is run in turn, in a single session;
//! with no arguments, the program is read from stdin.
//!
//! ```ignore
//! lisplet lib.l main.l
//! <main.l lisplet
//! ```
//!
//! Exits nonzero if any program fails.
//! Log verbosity is read from `LISPLET_LOG` (e.g. `LISPLET_LOG=debug`); the default is warnings only.

use std::process::ExitCode;

use lisplet::host::{run_files, run_reader};
use lisplet::Interpreter;
use tracing_subscriber::filter::LevelFilter;

fn main() -> ExitCode {
    let level = std::env::var("LISPLET_LOG")
        .ok()
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let result = Interpreter::new()
        .map_err(std::io::Error::from)
        .and_then(|interp| {
            if paths.is_empty() {
                run_reader(&interp, &mut std::io::stdin().lock())
            } else {
                run_files(&interp, &paths)
            }
        });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
