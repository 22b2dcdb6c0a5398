//! # antdb CLI Entry Point
//!
//! Binary entry point for the read-only SQLite file query engine.
//!
//! ## Usage
//!
//! ```bash
//! antdb sample.db .dbinfo
//! antdb sample.db .tables
//! antdb sample.db "SELECT count(*) FROM companies"
//! ```
//!
//! Exit code 0 on success; any error prints a one-line diagnostic on stderr
//! and exits 1.

use antdb::cli;
use antdb::storage::StorageEngine;
use eyre::{Result, WrapErr};
use std::env;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("antdb: fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        print_usage();
        eyre::bail!("expected a database path and a command");
    }
    let (path, command) = (&args[1], &args[2]);

    let storage = StorageEngine::open(Path::new(path))
        .wrap_err_with(|| format!("failed to open database at {path}"))?;
    let output = cli::dispatch(&storage, command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn print_usage() {
    eprintln!("antdb - read-only SQLite file query engine");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    antdb <DATABASE_PATH> <COMMAND>");
    eprintln!();
    eprintln!("COMMANDS:");
    eprintln!("    .dbinfo     Print header-derived database facts");
    eprintln!("    .tables     List user table names");
    eprintln!("    .schema     Print the schema objects");
    eprintln!("    .indices    List secondary indices");
    eprintln!("    <SQL>       Evaluate a single SELECT statement");
}
